//! Food placement.

use std::collections::HashSet;

use gridsnake_protocol::Cell;
use rand::Rng;

use crate::Grid;

/// Rejection-sampling attempts before falling back to a full scan.
const RANDOM_ATTEMPTS: usize = 100;

/// Picks a cell for the food that no body currently covers.
///
/// Rejection-samples first; if the grid is crowded enough that sampling
/// keeps missing, falls back to choosing uniformly among the enumerated
/// free cells. Returns `None` only when every cell is covered.
pub fn place_food(grid: Grid, occupied: &HashSet<Cell>, rng: &mut impl Rng) -> Option<Cell> {
    for _ in 0..RANDOM_ATTEMPTS {
        let cell = Cell::new(rng.random_range(0..grid.size), rng.random_range(0..grid.size));
        if !occupied.contains(&cell) {
            return Some(cell);
        }
    }

    let free: Vec<Cell> = grid.cells().filter(|c| !occupied.contains(c)).collect();
    if free.is_empty() {
        None
    } else {
        Some(free[rng.random_range(0..free.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn placed_food_avoids_occupied_cells() {
        let grid = Grid::new(20);
        let occupied: HashSet<Cell> =
            [Cell::new(1, 1), Cell::new(2, 1), Cell::new(3, 1)].into();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let food = place_food(grid, &occupied, &mut rng).unwrap();
            assert!(!occupied.contains(&food));
            assert!(grid.contains(food));
        }
    }

    #[test]
    fn single_free_cell_is_found() {
        let grid = Grid::new(4);
        let gap = Cell::new(2, 2);
        let occupied: HashSet<Cell> = grid.cells().filter(|c| *c != gap).collect();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(place_food(grid, &occupied, &mut rng), Some(gap));
    }

    #[test]
    fn full_grid_yields_none() {
        let grid = Grid::new(4);
        let occupied: HashSet<Cell> = grid.cells().collect();
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(place_food(grid, &occupied, &mut rng), None);
    }
}
