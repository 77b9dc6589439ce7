//! Random placement of new sneks and food
//!
//! Generation never touches the grid: it only reads occupancy and hands back
//! an entity for the caller to insert, so a failed attempt leaves no trace.

use crate::config::GameConfig;
use crate::error::GameError;
use crate::grid::Grid;
use crate::occupancy::Occupancy;
use log::{debug, warn};
use rand::Rng;
use shared::{Coord, Rgb, Snek, SnekColor};
use std::collections::VecDeque;
use uuid::Builder;

/// Color channels are drawn from `[0, COLOR_CHANNEL_MAX)` to keep sneks off pure white.
const COLOR_CHANNEL_MAX: u8 = 200;

/// Picks a random on-board cell.
///
/// With `for_spawn` the x range is shortened by `base_snek_size + 1` so a
/// body laid out in +x from the head stays on the board. Returns `None` when
/// the board is too small to hold any candidate.
pub fn random_position<R: Rng + ?Sized>(
    grid: &Grid,
    base_snek_size: usize,
    for_spawn: bool,
    rng: &mut R,
) -> Option<Coord> {
    if grid.height() <= 0 {
        return None;
    }
    let x = if for_spawn {
        let max_x = grid.width() - (base_snek_size as i32 + 1);
        if max_x < 0 {
            return None;
        }
        rng.gen_range(0..=max_x)
    } else {
        if grid.width() <= 0 {
            return None;
        }
        rng.gen_range(0..grid.width())
    };
    let y = rng.gen_range(0..grid.height());
    Some(Coord::new(x, y))
}

/// Random head/body palette. The head uses the body's channels in reverse order.
pub fn random_colors<R: Rng + ?Sized>(rng: &mut R) -> SnekColor {
    let r = rng.gen_range(0..COLOR_CHANNEL_MAX);
    let g = rng.gen_range(0..COLOR_CHANNEL_MAX);
    let b = rng.gen_range(0..COLOR_CHANNEL_MAX);

    SnekColor {
        head: Rgb { r: b, g, b: r },
        body: Rgb { r, g, b },
    }
}

/// Generates a straight snek of `base_snek_size + 1` cells on free ground.
pub fn spawn_snek<R: Rng + ?Sized>(
    grid: &Grid,
    config: &GameConfig,
    rng: &mut R,
) -> Result<Snek, GameError> {
    for attempt in 0..config.spawn_retries {
        let head = random_position(grid, config.base_snek_size, true, rng)
            .ok_or(GameError::NoSpace)?;
        let body: VecDeque<Coord> = (0..=config.base_snek_size as i32)
            .map(|i| Coord::new(head.x + i, head.y))
            .collect();

        if grid.all_empty(&body) {
            let id = Builder::from_random_bytes(rng.gen()).into_uuid();
            return Ok(Snek::new(id, body, random_colors(rng)));
        }
        debug!("Snek spawn attempt {} at {} collided", attempt + 1, head);
    }

    warn!(
        "Gave up spawning a snek after {} attempts",
        config.spawn_retries
    );
    Err(GameError::NoSpace)
}

/// Finds a free cell for a new food item.
pub fn spawn_food<R: Rng + ?Sized>(
    grid: &Grid,
    config: &GameConfig,
    rng: &mut R,
) -> Result<Coord, GameError> {
    for attempt in 0..config.spawn_retries {
        let coord = random_position(grid, config.base_snek_size, false, rng)
            .ok_or(GameError::NoSpace)?;

        if grid.classify(coord) == Occupancy::Empty {
            return Ok(coord);
        }
        debug!("Food spawn attempt {} at {} collided", attempt + 1, coord);
    }

    warn!(
        "Gave up spawning food after {} attempts",
        config.spawn_retries
    );
    Err(GameError::NoSpace)
}
