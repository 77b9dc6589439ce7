//! Authoritative board state shared by every connection
//!
//! The grid holds the dimensions, every live snek keyed by id and the active
//! food cells. It has no game rules of its own: reads are public, writes are
//! crate-private so only the game engine mutates it.

use shared::{Coord, GridSnapshot, Snek, SnekId};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Grid {
    width: i32,
    height: i32,
    sneks: HashMap<SnekId, Snek>,
    foods: Vec<Coord>,
}

impl Grid {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            sneks: HashMap::new(),
            foods: Vec::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn sneks(&self) -> &HashMap<SnekId, Snek> {
        &self.sneks
    }

    pub fn snek(&self, id: &SnekId) -> Option<&Snek> {
        self.sneks.get(id)
    }

    pub fn contains_snek(&self, id: &SnekId) -> bool {
        self.sneks.contains_key(id)
    }

    pub fn foods(&self) -> &[Coord] {
        &self.foods
    }

    /// Copies the full board into the form pushed to viewers.
    pub fn snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            width: self.width,
            height: self.height,
            sneks: self.sneks.clone(),
            foods: self.foods.clone(),
        }
    }

    pub(crate) fn snek_mut(&mut self, id: &SnekId) -> Option<&mut Snek> {
        self.sneks.get_mut(id)
    }

    pub(crate) fn insert_snek(&mut self, snek: Snek) {
        self.sneks.insert(snek.id, snek);
    }

    pub(crate) fn remove_snek(&mut self, id: &SnekId) -> Option<Snek> {
        self.sneks.remove(id)
    }

    pub(crate) fn push_food(&mut self, coord: Coord) {
        self.foods.push(coord);
    }

    /// Drops every food entry at `coord`. Returns true if any was removed.
    pub(crate) fn remove_food(&mut self, coord: Coord) -> bool {
        let before = self.foods.len();
        self.foods.retain(|food| *food != coord);
        self.foods.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Rgb, SnekColor};
    use uuid::Uuid;

    fn snek_at(cells: &[(i32, i32)]) -> Snek {
        let color = SnekColor {
            head: Rgb { r: 0, g: 0, b: 0 },
            body: Rgb { r: 0, g: 0, b: 0 },
        };
        let body = cells.iter().map(|&(x, y)| Coord::new(x, y)).collect();
        Snek::new(Uuid::new_v4(), body, color)
    }

    #[test]
    fn test_grid_creation() {
        let grid = Grid::new(80, 40);
        assert_eq!(grid.width(), 80);
        assert_eq!(grid.height(), 40);
        assert!(grid.sneks().is_empty());
        assert!(grid.foods().is_empty());
    }

    #[test]
    fn test_insert_and_remove_snek() {
        let mut grid = Grid::new(10, 10);
        let snek = snek_at(&[(1, 1), (2, 1)]);
        let id = snek.id;

        grid.insert_snek(snek);
        assert!(grid.contains_snek(&id));
        assert_eq!(grid.snek(&id).map(|s| s.len()), Some(2));

        assert!(grid.remove_snek(&id).is_some());
        assert!(!grid.contains_snek(&id));
        assert!(grid.remove_snek(&id).is_none());
    }

    #[test]
    fn test_remove_food() {
        let mut grid = Grid::new(10, 10);
        grid.push_food(Coord::new(1, 1));
        grid.push_food(Coord::new(2, 2));

        assert!(grid.remove_food(Coord::new(1, 1)));
        assert_eq!(grid.foods(), &[Coord::new(2, 2)]);
        assert!(!grid.remove_food(Coord::new(1, 1)));
    }

    #[test]
    fn test_snapshot_copies_everything() {
        let mut grid = Grid::new(12, 7);
        let snek = snek_at(&[(3, 3), (4, 3), (5, 3)]);
        let id = snek.id;
        grid.insert_snek(snek);
        grid.push_food(Coord::new(0, 0));

        let snapshot = grid.snapshot();
        assert_eq!(snapshot.width, 12);
        assert_eq!(snapshot.height, 7);
        assert_eq!(snapshot.foods, vec![Coord::new(0, 0)]);
        assert_eq!(snapshot.sneks[&id].body.len(), 3);
    }
}
