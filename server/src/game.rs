use crate::config::GameConfig;
use crate::error::GameError;
use crate::grid::Grid;
use crate::occupancy::Occupancy;
use crate::spawner;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{Coord, Direction, SnekId};
use std::collections::HashMap;

/// Receives the grid after every mutation.
///
/// Observers run synchronously inside the mutating call, so they always see a
/// consistent board. They must not block; a listener that wants to do I/O
/// should hand the data off (for example through a `watch` channel).
pub trait StateObserver: Send {
    fn on_state_changed(&mut self, grid: &Grid);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Ok,
    /// The snek hit a wall or a body and has been removed.
    Collision,
}

/// Identifies one message set on a snek. Only the latest ticket can clear it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageTicket {
    pub id: SnekId,
    generation: u64,
}

pub struct GameState {
    grid: Grid,
    config: GameConfig,
    rng: StdRng,
    observers: Vec<Box<dyn StateObserver>>,
    message_generations: HashMap<SnekId, u64>,
    next_generation: u64,
}

impl GameState {
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Self {
        Self {
            grid: Grid::new(config.width, config.height),
            config,
            rng,
            observers: Vec::new(),
            message_generations: HashMap::new(),
            next_generation: 0,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn add_observer(&mut self, observer: Box<dyn StateObserver>) {
        self.observers.push(observer);
    }

    fn notify(&mut self) {
        for observer in self.observers.iter_mut() {
            observer.on_state_changed(&self.grid);
        }
    }

    /// Spawns a snek for a new player and tops up one food item.
    ///
    /// The food attempt happens whether or not the snek fit on the board.
    pub fn add_snek(&mut self) -> Result<SnekId, GameError> {
        if self.grid.sneks().len() >= self.config.max_players {
            warn!(
                "Rejecting new snek, {} players already on the grid",
                self.config.max_players
            );
            return Err(GameError::ServerFull);
        }

        let spawned = spawner::spawn_snek(&self.grid, &self.config, &mut self.rng);
        let result = match spawned {
            Ok(snek) => {
                let id = snek.id;
                info!("Added snek {} at {:?}", id, snek.head());
                self.grid.insert_snek(snek);
                Ok(id)
            }
            Err(e) => {
                warn!("Failed to spawn snek: {}", e);
                Err(GameError::SpawnFailed)
            }
        };

        let fed = self.add_food().is_some();
        if result.is_ok() || fed {
            self.notify();
        }
        result
    }

    /// Places a single food item. Failure is logged and tolerated.
    fn add_food(&mut self) -> Option<Coord> {
        match spawner::spawn_food(&self.grid, &self.config, &mut self.rng) {
            Ok(coord) => {
                debug!("Generated food at {}", coord);
                self.grid.push_food(coord);
                Some(coord)
            }
            Err(e) => {
                warn!("Failed to generate food: {}", e);
                None
            }
        }
    }

    /// Tops the food count up to the configured minimum.
    pub fn ensure_min_food(&mut self) {
        let missing = self.config.min_food.saturating_sub(self.grid.foods().len());
        let mut added = 0;
        for _ in 0..missing {
            if self.add_food().is_some() {
                added += 1;
            }
        }
        if added > 0 {
            self.notify();
        }
    }

    /// Advances one snek by a single cell.
    ///
    /// Moving back onto the neck is ignored. Eating grows the body by one and
    /// replaces the food; hitting a wall or any body removes the snek. An id
    /// that is no longer on the grid is a no-op, since a removal can race a
    /// queued move.
    pub fn move_snek(&mut self, id: &SnekId, direction: Direction) -> MoveOutcome {
        let Some(snek) = self.grid.snek(id) else {
            debug!("Ignoring move for missing snek {}", id);
            return MoveOutcome::Ok;
        };
        let Some(head) = snek.head() else {
            return MoveOutcome::Ok;
        };
        let new_head = head.offset(direction);
        if snek.neck() == Some(new_head) {
            return MoveOutcome::Ok;
        }

        match self.grid.classify(new_head) {
            Occupancy::Empty => {
                if let Some(snek) = self.grid.snek_mut(id) {
                    snek.body.pop_back();
                    snek.body.push_front(new_head);
                }
                self.notify();
                MoveOutcome::Ok
            }
            Occupancy::Food => {
                if let Some(snek) = self.grid.snek_mut(id) {
                    snek.body.push_front(new_head);
                }
                self.grid.remove_food(new_head);
                self.add_food();
                self.notify();
                MoveOutcome::Ok
            }
            Occupancy::OutOfBounds | Occupancy::Body => {
                info!("Snek {} collided at {}", id, new_head);
                self.grid.remove_snek(id);
                self.message_generations.remove(id);
                self.notify();
                MoveOutcome::Collision
            }
        }
    }

    /// Sets a snek's message. The returned ticket clears it later unless a
    /// newer message has replaced it in the meantime.
    pub fn update_message(&mut self, id: &SnekId, text: String) -> Option<MessageTicket> {
        let snek = self.grid.snek_mut(id)?;
        snek.message = text;

        self.next_generation += 1;
        let generation = self.next_generation;
        self.message_generations.insert(*id, generation);
        self.notify();

        Some(MessageTicket {
            id: *id,
            generation,
        })
    }

    /// Clears the message if the ticket is still the current one.
    pub fn clear_message(&mut self, ticket: MessageTicket) -> bool {
        if self.message_generations.get(&ticket.id) != Some(&ticket.generation) {
            return false;
        }
        self.message_generations.remove(&ticket.id);
        match self.grid.snek_mut(&ticket.id) {
            Some(snek) => {
                snek.message.clear();
                self.notify();
                true
            }
            None => false,
        }
    }

    /// Removes a snek. Removing an id that is already gone does nothing.
    pub fn remove_snek(&mut self, id: &SnekId) -> bool {
        self.message_generations.remove(id);
        if self.grid.remove_snek(id).is_some() {
            info!("Removed snek {}", id);
            self.notify();
            true
        } else {
            false
        }
    }
}
