//! Server configuration

use serde::{Deserialize, Serialize};
use shared::{
    BASE_SNEK_SIZE, GRID_HEIGHT, GRID_WIDTH, IDLE_TIMEOUT_MS, MAX_SPAWN_RETRIES,
    MESSAGE_TTL_MS, MIN_FOOD, SNEK_PORT, VIEWER_PORT,
};
use std::net::SocketAddr;
use std::time::Duration;

/// Rules of the shared board
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    pub width: i32,
    pub height: i32,
    /// Segments trailing the head of a freshly spawned snek
    pub base_snek_size: usize,
    /// Food count the board is topped up to
    pub min_food: usize,
    /// Attempts made by random placement before giving up
    pub spawn_retries: u32,
    /// Maximum number of live sneks
    pub max_players: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
            base_snek_size: BASE_SNEK_SIZE,
            min_food: MIN_FOOD,
            spawn_retries: MAX_SPAWN_RETRIES,
            max_players: 64,
        }
    }
}

/// Server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address players connect to with the text protocol
    pub player_address: SocketAddr,
    /// Address viewers connect to for grid snapshots
    pub viewer_address: SocketAddr,
    /// A session with no inbound data for this long is killed
    pub idle_timeout: Duration,
    /// How long a said message stays on a snek
    pub message_ttl: Duration,
    /// Fixed RNG seed, for reproducible spawns
    pub seed: Option<u64>,
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            player_address: SocketAddr::from(([0, 0, 0, 0], SNEK_PORT)),
            viewer_address: SocketAddr::from(([0, 0, 0, 0], VIEWER_PORT)),
            idle_timeout: Duration::from_millis(IDLE_TIMEOUT_MS),
            message_ttl: Duration::from_millis(MESSAGE_TTL_MS),
            seed: None,
            game: GameConfig::default(),
        }
    }
}
