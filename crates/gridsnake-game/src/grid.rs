//! Grid bounds and occupancy testing.

use std::collections::HashSet;

use gridsnake_protocol::Cell;

use crate::Player;

/// The square play grid. Cells range over `[0, size)` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub size: i32,
}

impl Grid {
    pub fn new(size: i32) -> Self {
        Self { size }
    }

    /// Whether `cell` lies inside the grid.
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.size && cell.y >= 0 && cell.y < self.size
    }

    /// Iterates every cell of the grid, row-major.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let size = self.size;
        (0..size).flat_map(move |y| (0..size).map(move |x| Cell::new(x, y)))
    }
}

/// The set of cells covered by any body among `players`.
///
/// Structured coordinates, not string keys: membership tests during
/// collision resolution are O(1) hash lookups.
pub fn occupancy<'a>(players: impl Iterator<Item = &'a Player>) -> HashSet<Cell> {
    players
        .flat_map(|p| p.body.iter().copied())
        .collect()
}
