//! Single owner task for the game state
//!
//! Every connection talks to the grid through a [`WorldHandle`]. Requests are
//! queued on one channel and applied one at a time by [`run_world`], which
//! makes each mutation atomic with respect to the others and lets observers
//! snapshot the board without seeing a half-applied move.

use crate::error::GameError;
use crate::game::{GameState, MessageTicket, MoveOutcome};
use log::debug;
use shared::{Command, SnekId};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

/// Requests handled by the world task
#[derive(Debug)]
pub enum WorldRequest {
    Join {
        reply: oneshot::Sender<Result<SnekId, GameError>>,
    },
    Apply {
        id: SnekId,
        command: Command,
        reply: oneshot::Sender<MoveOutcome>,
    },
    ClearMessage {
        ticket: MessageTicket,
    },
    Leave {
        id: SnekId,
    },
    /// Stops the task. Requests queued behind it are dropped.
    Shutdown,
}

/// Cloneable front door to the world task
#[derive(Debug, Clone)]
pub struct WorldHandle {
    tx: mpsc::UnboundedSender<WorldRequest>,
}

impl WorldHandle {
    /// Spawns the world task on the current runtime and returns its handle.
    pub fn spawn(state: GameState, message_ttl: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = WorldHandle { tx };
        tokio::spawn(run_world(state, rx, handle.clone(), message_ttl));
        handle
    }

    /// Creates a snek for a new connection and makes sure food is on the board.
    pub async fn join(&self) -> Result<SnekId, GameError> {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(WorldRequest::Join { reply }).is_err() {
            return Err(GameError::SpawnFailed);
        }
        rx.await.unwrap_or(Err(GameError::SpawnFailed))
    }

    /// Applies one decoded command on behalf of `id`.
    pub async fn apply(&self, id: SnekId, command: Command) -> MoveOutcome {
        let (reply, rx) = oneshot::channel();
        if self
            .tx
            .send(WorldRequest::Apply { id, command, reply })
            .is_err()
        {
            return MoveOutcome::Ok;
        }
        rx.await.unwrap_or(MoveOutcome::Ok)
    }

    /// Removes the snek. Safe to call after the snek already died.
    pub fn leave(&self, id: SnekId) {
        let _ = self.tx.send(WorldRequest::Leave { id });
    }

    /// Asks the world task to stop. Later requests fail as if the world were gone.
    pub fn shutdown(&self) {
        let _ = self.tx.send(WorldRequest::Shutdown);
    }

    fn clear_message(&self, ticket: MessageTicket) {
        let _ = self.tx.send(WorldRequest::ClearMessage { ticket });
    }
}

/// Applies requests in arrival order.
pub async fn run_world(
    mut state: GameState,
    mut rx: mpsc::UnboundedReceiver<WorldRequest>,
    handle: WorldHandle,
    message_ttl: Duration,
) {
    // Message timers hold handles back into this task, so the channel never
    // closes on its own; only `Shutdown` ends the loop.
    while let Some(request) = rx.recv().await {
        match request {
            WorldRequest::Join { reply } => {
                let joined = state.add_snek();
                state.ensure_min_food();
                let _ = reply.send(joined);
            }
            WorldRequest::Apply { id, command, reply } => {
                let outcome = apply_command(&mut state, &handle, message_ttl, id, command);
                let _ = reply.send(outcome);
            }
            WorldRequest::ClearMessage { ticket } => {
                if !state.clear_message(ticket) {
                    debug!("Message for snek {} was superseded", ticket.id);
                }
            }
            WorldRequest::Leave { id } => {
                state.remove_snek(&id);
            }
            WorldRequest::Shutdown => break,
        }
    }
    debug!("World task stopped with {} sneks", state.grid().sneks().len());
}

fn apply_command(
    state: &mut GameState,
    handle: &WorldHandle,
    message_ttl: Duration,
    id: SnekId,
    command: Command,
) -> MoveOutcome {
    debug!("Snek {}: {:?}", id, command);
    match command {
        Command::Move(direction) => state.move_snek(&id, direction),
        Command::Say(text) | Command::Name(text) => {
            if let Some(ticket) = state.update_message(&id, text) {
                let handle = handle.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(message_ttl).await;
                    handle.clear_message(ticket);
                });
            }
            MoveOutcome::Ok
        }
        Command::Unknown => MoveOutcome::Ok,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::StateObserver;
    use crate::grid::Grid;
    use shared::{Direction, GridSnapshot};
    use tokio::sync::watch;
    use tokio_test::assert_ok;

    struct WatchObserver(watch::Sender<GridSnapshot>);

    impl StateObserver for WatchObserver {
        fn on_state_changed(&mut self, grid: &Grid) {
            self.0.send_replace(grid.snapshot());
        }
    }

    fn spawn_world(ttl: Duration) -> (WorldHandle, watch::Receiver<GridSnapshot>) {
        let mut state = GameState::with_seed(GameConfig::default(), 9);
        let (tx, rx) = watch::channel(GridSnapshot::default());
        state.add_observer(Box::new(WatchObserver(tx)));
        (WorldHandle::spawn(state, ttl), rx)
    }

    #[tokio::test]
    async fn test_join_spawns_snek_and_food() {
        let (world, rx) = spawn_world(Duration::from_secs(4));
        let id = assert_ok!(world.join().await);

        let snapshot = rx.borrow().clone();
        assert!(snapshot.sneks.contains_key(&id));
        assert_eq!(snapshot.foods.len(), shared::MIN_FOOD);
    }

    #[tokio::test]
    async fn test_leave_removes_snek() {
        let (world, mut rx) = spawn_world(Duration::from_secs(4));
        let id = assert_ok!(world.join().await);
        rx.borrow_and_update();

        world.leave(id);
        rx.changed().await.unwrap();
        assert!(!rx.borrow().sneks.contains_key(&id));
    }

    #[tokio::test]
    async fn test_unknown_command_is_ignored() {
        let (world, rx) = spawn_world(Duration::from_secs(4));
        let id = assert_ok!(world.join().await);
        let before = rx.borrow().clone();

        assert_eq!(world.apply(id, Command::Unknown).await, MoveOutcome::Ok);
        assert_eq!(*rx.borrow(), before);
    }

    #[tokio::test]
    async fn test_walking_off_the_board_collides() {
        let (world, rx) = spawn_world(Duration::from_secs(4));
        let id = assert_ok!(world.join().await);

        let mut outcome = MoveOutcome::Ok;
        for _ in 0..200 {
            outcome = world.apply(id, Command::Move(Direction::Up)).await;
            if outcome == MoveOutcome::Collision {
                break;
            }
        }
        assert_eq!(outcome, MoveOutcome::Collision);
        assert!(!rx.borrow().sneks.contains_key(&id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_clears_after_ttl() {
        let ttl = Duration::from_millis(4000);
        let (world, rx) = spawn_world(ttl);
        let id = assert_ok!(world.join().await);

        world.apply(id, Command::Say("hello".into())).await;
        assert_eq!(rx.borrow().sneks[&id].message, "hello");

        tokio::time::sleep(Duration::from_millis(3900)).await;
        assert_eq!(rx.borrow().sneks[&id].message, "hello");

        tokio::time::sleep(Duration::from_millis(200)).await;
        world.apply(id, Command::Unknown).await;
        assert!(rx.borrow().sneks[&id].message.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_message_survives_older_timer() {
        let ttl = Duration::from_millis(4000);
        let (world, rx) = spawn_world(ttl);
        let id = assert_ok!(world.join().await);

        world.apply(id, Command::Say("first".into())).await;
        tokio::time::sleep(Duration::from_millis(3000)).await;
        world.apply(id, Command::Name("second".into())).await;

        // The first timer fires here but the second message is newer.
        tokio::time::sleep(Duration::from_millis(1500)).await;
        world.apply(id, Command::Unknown).await;
        assert_eq!(rx.borrow().sneks[&id].message, "second");

        tokio::time::sleep(Duration::from_millis(3000)).await;
        world.apply(id, Command::Unknown).await;
        assert!(rx.borrow().sneks[&id].message.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_world_with_pending_timer() {
        let (world, mut rx) = spawn_world(Duration::from_millis(4000));
        let id = assert_ok!(world.join().await);
        world.apply(id, Command::Say("bye".into())).await;

        world.shutdown();
        // The observer is dropped with the state once the task returns.
        while rx.changed().await.is_ok() {}

        assert_eq!(world.join().await, Err(GameError::SpawnFailed));
        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(world.apply(id, Command::Unknown).await, MoveOutcome::Ok);
    }
}
