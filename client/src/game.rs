use log::debug;
use shared::{Direction, GridSnapshot, Snek};

/// Where the player connection currently stands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Playing,
    /// The server ended the game with a notice.
    Dead(String),
    /// The connection dropped or could not be opened.
    Disconnected(String),
}

impl ConnectionStatus {
    pub fn is_alive(&self) -> bool {
        matches!(self, ConnectionStatus::Playing)
    }
}

/// Client-side view of the board
pub struct ClientGameState {
    pub snapshot: Option<GridSnapshot>,
    pub status: ConnectionStatus,
    pub last_direction: Option<Direction>,
    pub snapshots_received: u64,
}

impl ClientGameState {
    pub fn new() -> Self {
        Self {
            snapshot: None,
            status: ConnectionStatus::Connecting,
            // A fresh snek trails off in +x, so it is effectively heading left.
            last_direction: Some(Direction::Left),
            snapshots_received: 0,
        }
    }

    pub fn apply_snapshot(&mut self, snapshot: GridSnapshot) {
        self.snapshots_received += 1;
        debug!(
            "Snapshot {}: {} sneks, {} food",
            self.snapshots_received,
            snapshot.sneks.len(),
            snapshot.foods.len()
        );
        self.snapshot = Some(snapshot);
    }

    pub fn set_status(&mut self, status: ConnectionStatus) {
        self.status = status;
    }

    /// Records a steering request and reports whether it is worth sending.
    ///
    /// The server ignores a reversal into the neck, so those are dropped here.
    pub fn steer(&mut self, direction: Direction) -> bool {
        if !self.status.is_alive() {
            return false;
        }
        if self.last_direction.map(Direction::opposite) == Some(direction) {
            return false;
        }
        self.last_direction = Some(direction);
        true
    }

    /// Sneks ordered longest first, ties broken by id for a stable display.
    pub fn leaderboard(&self) -> Vec<&Snek> {
        let Some(snapshot) = &self.snapshot else {
            return Vec::new();
        };
        let mut sneks: Vec<&Snek> = snapshot.sneks.values().collect();
        sneks.sort_by(|a, b| b.len().cmp(&a.len()).then(a.id.cmp(&b.id)));
        sneks
    }

    pub fn player_count(&self) -> usize {
        self.snapshot.as_ref().map_or(0, |s| s.sneks.len())
    }

    pub fn food_count(&self) -> usize {
        self.snapshot.as_ref().map_or(0, |s| s.foods.len())
    }
}

impl Default for ClientGameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Coord, Rgb, SnekColor};
    use uuid::Uuid;

    fn id(n: u8) -> Uuid {
        Uuid::from_u128(n as u128)
    }

    fn snek(n: u8, len: i32) -> Snek {
        let color = SnekColor {
            head: Rgb { r: n, g: 0, b: 0 },
            body: Rgb { r: 0, g: 0, b: n },
        };
        let body = (0..len).map(|i| Coord::new(i, n as i32)).collect();
        Snek::new(id(n), body, color)
    }

    fn snapshot(sneks: Vec<Snek>) -> GridSnapshot {
        GridSnapshot {
            width: 80,
            height: 40,
            sneks: sneks.into_iter().map(|s| (s.id, s)).collect(),
            foods: vec![Coord::new(1, 1), Coord::new(2, 2)],
        }
    }

    #[test]
    fn test_client_state_creation() {
        let state = ClientGameState::new();
        assert!(state.snapshot.is_none());
        assert_eq!(state.status, ConnectionStatus::Connecting);
        assert_eq!(state.player_count(), 0);
        assert_eq!(state.food_count(), 0);
        assert!(state.leaderboard().is_empty());
    }

    #[test]
    fn test_apply_snapshot() {
        let mut state = ClientGameState::new();
        state.apply_snapshot(snapshot(vec![snek(1, 5), snek(2, 7)]));

        assert_eq!(state.snapshots_received, 1);
        assert_eq!(state.player_count(), 2);
        assert_eq!(state.food_count(), 2);
    }

    #[test]
    fn test_leaderboard_orders_by_length() {
        let mut state = ClientGameState::new();
        state.apply_snapshot(snapshot(vec![snek(1, 5), snek(2, 9), snek(3, 6)]));

        let lengths: Vec<usize> = state.leaderboard().iter().map(|s| s.len()).collect();
        assert_eq!(lengths, vec![9, 6, 5]);
    }

    #[test]
    fn test_steer_skips_reversal() {
        let mut state = ClientGameState::new();
        state.set_status(ConnectionStatus::Playing);

        assert!(!state.steer(Direction::Right));
        assert!(state.steer(Direction::Up));
        assert!(!state.steer(Direction::Down));
        assert!(state.steer(Direction::Right));
    }

    #[test]
    fn test_steer_requires_live_snek() {
        let mut state = ClientGameState::new();
        assert!(!state.steer(Direction::Up));

        state.set_status(ConnectionStatus::Dead("gone".into()));
        assert!(!state.steer(Direction::Up));
    }
}
