//! Occupancy queries over the grid
//!
//! Classification checks bounds first, then food, then every snek body, and
//! reports the first match. That order decides whether a move eats or
//! collides should a food cell ever coincide with a body.

use crate::grid::Grid;
use shared::Coord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occupancy {
    OutOfBounds,
    Food,
    Body,
    Empty,
}

impl Grid {
    pub fn in_bounds(&self, coord: Coord) -> bool {
        coord.x >= 0 && coord.y >= 0 && coord.x < self.width() && coord.y < self.height()
    }

    /// Classifies a single cell with a linear scan of foods and bodies.
    pub fn classify(&self, coord: Coord) -> Occupancy {
        if !self.in_bounds(coord) {
            return Occupancy::OutOfBounds;
        }
        if self.foods().iter().any(|food| *food == coord) {
            return Occupancy::Food;
        }
        let on_body = self
            .sneks()
            .values()
            .any(|snek| snek.body.iter().any(|part| *part == coord));
        if on_body {
            return Occupancy::Body;
        }
        Occupancy::Empty
    }

    /// True iff every cell classifies as `Empty`. Stops at the first occupied cell.
    pub fn all_empty<'a, I>(&self, coords: I) -> bool
    where
        I: IntoIterator<Item = &'a Coord>,
    {
        coords
            .into_iter()
            .all(|coord| self.classify(*coord) == Occupancy::Empty)
    }
}
