//! Spawn placement: corner presets, randomized fallback, fixed default.

use std::collections::HashSet;

use gridsnake_protocol::{Cell, Dir};
use rand::Rng;

use crate::Grid;

/// Body length of every fresh spawn.
const SPAWN_BODY_LEN: i32 = 3;

/// Randomized placement attempts before giving up on strategy 2.
const RANDOM_ATTEMPTS: usize = 300;

/// A computed spawn: a 3-cell body (tail → head) plus initial direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnPlan {
    pub body: Vec<Cell>,
    pub dir: Dir,
}

/// The four fixed corner presets for a grid of the given size, in
/// preference order: near each corner, facing inward. Deterministic and
/// visually distributed — enough for the 4-player cap.
pub fn corner_presets(grid: Grid) -> [SpawnPlan; 4] {
    let g = grid.size;
    let top = 3;
    let bottom = g - 4;
    let left = |y: i32| SpawnPlan {
        body: vec![Cell::new(1, y), Cell::new(2, y), Cell::new(3, y)],
        dir: Dir::RIGHT,
    };
    let right = |y: i32| SpawnPlan {
        body: vec![Cell::new(g - 2, y), Cell::new(g - 3, y), Cell::new(g - 4, y)],
        dir: Dir::LEFT,
    };
    [left(top), right(top), left(bottom), right(bottom)]
}

/// Computes a non-colliding spawn against the current occupancy set.
///
/// Strategy, in order of preference:
///
/// 1. The first corner preset whose three cells are all in-bounds and
///    free of every existing body.
/// 2. Up to [`RANDOM_ATTEMPTS`] randomized placements: a random head cell
///    free of bodies and food, a random cardinal direction, accepted when
///    the whole body is in-bounds. Only the head is re-checked against
///    bodies here; the two trailing cells are not — a rare, harmless
///    overlap kept as documented behavior.
/// 3. A fixed default near the top-left corner. Unreachable in practice
///    under the 4-player cap on a 20×20 grid.
pub fn plan_spawn(
    grid: Grid,
    occupied: &HashSet<Cell>,
    food: Option<Cell>,
    rng: &mut impl Rng,
) -> SpawnPlan {
    for preset in corner_presets(grid) {
        let clear = preset
            .body
            .iter()
            .all(|c| grid.contains(*c) && !occupied.contains(c));
        if clear {
            return preset;
        }
    }

    for _ in 0..RANDOM_ATTEMPTS {
        let head = Cell::new(rng.random_range(0..grid.size), rng.random_range(0..grid.size));
        if occupied.contains(&head) || food == Some(head) {
            continue;
        }
        let dir = Dir::CARDINALS[rng.random_range(0..4)];
        let body: Vec<Cell> = (1..SPAWN_BODY_LEN)
            .rev()
            .map(|i| Cell::new(head.x - dir.x as i32 * i, head.y - dir.y as i32 * i))
            .chain(std::iter::once(head))
            .collect();
        if body.iter().all(|c| grid.contains(*c)) {
            return SpawnPlan { body, dir };
        }
    }

    SpawnPlan {
        body: vec![Cell::new(1, 1), Cell::new(2, 1), Cell::new(3, 1)],
        dir: Dir::RIGHT,
    }
}
