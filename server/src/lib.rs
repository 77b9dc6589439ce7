//! # Snek Server Library
//!
//! This library provides the authoritative server for a multiplayer snake game.
//! Players connect over a plain text TCP protocol and steer one snek each on a
//! shared grid; viewers connect to a second port and receive the whole board
//! every time it changes.
//!
//! ## Core Responsibilities
//!
//! ### Shared Grid
//! One board holds every live snek and the food on it. The grid is owned by a
//! single world task, so moves from different connections never interleave.
//!
//! ### Move Resolution
//! Each `Move` command advances a snek by one cell. Moving onto food grows the
//! snek and spawns replacement food; moving into a wall or any body kills it.
//! Reversing straight into the neck is ignored.
//!
//! ### Session Lifecycle
//! A connection gets a fresh snek when it opens and loses it when it closes,
//! stays silent for longer than the idle timeout, or collides.
//!
//! ## Module Organization
//!
//! - `grid`: the board store (dimensions, sneks by id, food cells)
//! - `occupancy`: out-of-bounds / food / body / empty classification
//! - `spawner`: random placement of new sneks and food with bounded retries
//! - `game`: the move resolver, food replenishment and message handling
//! - `world`: the task that owns the game state and serializes every mutation
//! - `session`: the per-connection protocol state machine
//! - `network`: TCP listeners and the viewer snapshot feed
//!
//! ## Wire Protocol
//!
//! Commands are text: `Move: left|right|up|down`, `Say: <text>` and
//! `Name: <text>`. A received chunk may carry several newline-separated
//! commands; unknown commands are ignored. Fatal events are reported with a
//! single line of text before the server closes the connection. Viewers get
//! length-prefixed bincode frames of the full grid.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let server = Server::bind(ServerConfig::default()).await?;
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod game;
pub mod grid;
pub mod network;
pub mod occupancy;
pub mod session;
pub mod spawner;
pub mod world;
