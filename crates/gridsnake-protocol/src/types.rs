//! Core protocol types shared by messages and the simulation.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player, stable for the lifetime of its
/// connection.
///
/// `#[serde(transparent)]` makes a `PlayerId(42)` serialize as plain `42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A short room code: five characters from an alphabet with the visually
/// ambiguous glyphs (0/O, 1/I) removed.
///
/// Codes are unique among live rooms; the registry enforces this at
/// creation time by rejection sampling.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(pub String);

impl RoomCode {
    /// Normalizes a client-supplied code: trimmed and upper-cased.
    pub fn normalized(raw: &str) -> Self {
        Self(raw.trim().to_ascii_uppercase())
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Grid geometry
// ---------------------------------------------------------------------------

/// One cell of the play grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The cell reached by moving one step in `dir`.
    pub fn step(self, dir: Dir) -> Self {
        Self {
            x: self.x + dir.x as i32,
            y: self.y + dir.y as i32,
        }
    }
}

/// An axis-aligned direction vector with components in {-1, 0, 1}.
///
/// Raw client input may carry arbitrary integers; [`Dir::clamped`]
/// brings the components into range and [`Dir::is_cardinal`] decides
/// whether the result is a usable movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dir {
    pub x: i8,
    pub y: i8,
}

impl Dir {
    pub const UP: Dir = Dir { x: 0, y: -1 };
    pub const DOWN: Dir = Dir { x: 0, y: 1 };
    pub const LEFT: Dir = Dir { x: -1, y: 0 };
    pub const RIGHT: Dir = Dir { x: 1, y: 0 };

    /// The four unit directions, used by randomized spawn placement.
    pub const CARDINALS: [Dir; 4] = [Dir::UP, Dir::DOWN, Dir::LEFT, Dir::RIGHT];

    pub fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    /// Clamps both components to {-1, 0, 1}.
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.clamp(-1, 1),
            y: self.y.clamp(-1, 1),
        }
    }

    /// True for exactly one of the four axis-aligned unit vectors.
    pub fn is_cardinal(self) -> bool {
        (self.x.abs() == 1 && self.y == 0) || (self.x == 0 && self.y.abs() == 1)
    }

    /// True when `self` points exactly opposite `other`.
    pub fn is_reverse_of(self, other: Dir) -> bool {
        self.x == -other.x && self.y == -other.y && (self.x != 0 || self.y != 0)
    }
}

// ---------------------------------------------------------------------------
// Room lifecycle
// ---------------------------------------------------------------------------

/// The lifecycle phase of a room.
///
/// Strictly ordered, no way back:
///
/// ```text
/// lobby → running → ended
/// ```
///
/// - **Lobby**: accepting joins, no simulation.
/// - **Running**: simulation active, time-bounded round.
/// - **Ended**: terminal. No further mutation, no new round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundPhase {
    Lobby,
    Running,
    Ended,
}

impl RoundPhase {
    /// Returns `true` if the room is accepting new players.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Lobby)
    }
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lobby => write!(f, "lobby"),
            Self::Running => write!(f, "running"),
            Self::Ended => write!(f, "ended"),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Everything a client needs to render one player.
///
/// `body` is ordered tail → head; an empty body means the player is dead
/// and waiting for its respawn deadline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
    pub score: u32,
    pub alive: bool,
    pub respawn_at: Option<u64>,
    pub body: Vec<Cell>,
    pub dir: Dir,
    /// Highest input sequence number the server has processed for this
    /// player. Monotonic non-decreasing.
    pub ack: u64,
}

/// A full serialization of room state.
///
/// Sent on join/leave (`players`), round start (`room`), round end
/// (`ended`), and — with `t`/`tick` added — every simulation tick
/// (`state`). Always a complete snapshot, never a delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub code: RoomCode,
    pub phase: RoundPhase,
    pub started_at: Option<u64>,
    pub ends_at: Option<u64>,
    pub grid: i32,
    pub speed: f64,
    pub food: Option<Cell>,
    pub players: Vec<PlayerSnapshot>,
}
