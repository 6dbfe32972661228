//! Simulation core for Gridsnake.
//!
//! Pure, synchronous game logic: no sockets, no timers, no tasks. The
//! room layer drives a [`RoomSim`] by calling [`RoomSim::tick`] at a
//! fixed rate with the current wall-clock time; everything else —
//! spawn placement, collision resolution, input reconciliation, food —
//! happens inside. Time always arrives as a `now_ms` parameter and the
//! RNG is seedable, so tests run deterministically.
//!
//! # Key types
//!
//! - [`RoomSim`] — one room's simulation state machine
//! - [`GameConfig`] — tunable constants (grid size, speed, round length)
//! - [`SimEvent`] — deaths, respawns, round end, surfaced per tick
//! - [`InputBuffer`] — latest-wins direction buffer per player

mod food;
mod grid;
mod input;
mod player;
mod sim;
mod spawn;
mod step;

pub use food::place_food;
pub use grid::{Grid, occupancy};
pub use input::{InputBuffer, InputSample};
pub use player::Player;
pub use sim::{JoinError, RoomSim, SimEvent};
pub use spawn::{SpawnPlan, corner_presets, plan_spawn};

use std::time::{SystemTime, UNIX_EPOCH};

/// Tunable simulation constants for one room.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Grid dimension; the board is `grid × grid` cells.
    pub grid: i32,
    /// Simulation tick rate in Hz.
    pub tick_hz: u32,
    /// Round duration in milliseconds.
    pub round_ms: u64,
    /// Movement speed in cells per second, decoupled from the tick rate.
    pub speed: f64,
    /// Score awarded per food cell consumed.
    pub reward: u32,
    /// Delay between death and respawn eligibility, in milliseconds.
    pub respawn_ms: u64,
    /// Hard cap on room membership.
    pub max_players: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid: 20,
            tick_hz: 20,
            round_ms: 120_000,
            speed: 7.5,
            reward: 10,
            respawn_ms: 2_000,
            max_players: 4,
        }
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
