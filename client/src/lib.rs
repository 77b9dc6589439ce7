//! # Snek Client Library
//!
//! Client-side pieces of the multiplayer snek game: a macroquad window that
//! draws the shared board and steers one snek with the keyboard.
//!
//! ## Architecture Overview
//!
//! The server is authoritative and the client keeps no simulation of its own.
//! It opens two TCP connections:
//!
//! - the **player** connection carries text commands such as `Move: up` and
//!   ends with a plain-text notice when the snek dies
//! - the **viewer** connection delivers length-prefixed board snapshots after
//!   every change on the server
//!
//! Both sockets live on a tokio runtime in a background thread, because the
//! macroquad render loop has to own the main thread.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! Latest snapshot, connection status and small derived views such as the
//! leaderboard.
//!
//! ### Input Module (`input`)
//! Arrow keys and WASD, with press detection and hold-to-repeat so a held key
//! keeps the connection from idling out.
//!
//! ### Network Module (`network`)
//! The background thread plus the frame reader and command writer it runs.
//!
//! ### Rendering Module (`rendering`)
//! Board layout math and the macroquad drawing calls.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::game::ClientGameState;
//! use client::network::{NetworkConfig, NetworkHandle};
//! use shared::{Command, Direction};
//!
//! let mut network = NetworkHandle::start(NetworkConfig {
//!     server: "127.0.0.1:50541".into(),
//!     viewer: "127.0.0.1:50542".into(),
//!     name: Some("ada".into()),
//! })?;
//! let mut game = ClientGameState::new();
//!
//! if let Some(snapshot) = network.latest_snapshot() {
//!     game.apply_snapshot(snapshot);
//! }
//! game.set_status(network.status());
//! if game.steer(Direction::Up) {
//!     network.send(Command::Move(Direction::Up));
//! }
//! # Ok::<(), std::io::Error>(())
//! ```

pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
