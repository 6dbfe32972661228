//! The tagged client/server message enums.
//!
//! Every frame on the wire is one of these, internally tagged with a
//! lowercase `type` field:
//!
//! ```json
//! { "type": "input", "dir": { "x": 1, "y": 0 }, "seq": 7 }
//! ```
//!
//! Frames that fail to decode are dropped silently by the server; the
//! enums here are matched exhaustively, so adding a kind forces every
//! dispatch site to handle it.

use serde::{Deserialize, Serialize};

use crate::{Cell, Dir, PlayerId, RoomSnapshot};

/// Why a player died during a movement step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeathReason {
    /// The next head cell was outside the grid.
    Wall,
    /// The next head cell was covered by a body (own or another's).
    Body,
}

/// Client → server messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Create a new room and join it as the first member.
    Create { name: String, color: String },
    /// Join an existing room by code.
    Join {
        code: String,
        name: String,
        color: String,
    },
    /// Start the round. Any member may send this; a no-op once running.
    Start,
    /// Buffered direction input. High-frequency, best-effort: invalid
    /// directions are ignored without a reply.
    Input { dir: Dir, seq: u64 },
    /// Round-trip probe; the server echoes `t` back in a `pong`.
    Ping { t: u64 },
}

/// Server → client messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    /// Sent once at connect: the assigned id plus the constants a client
    /// needs to set up rendering and prediction.
    Hello {
        id: PlayerId,
        grid: i32,
        tick_hz: u32,
        round_ms: u64,
        speed: f64,
    },
    /// To the joining connection only: its own id and a room snapshot.
    Joined { you: PlayerId, room: RoomSnapshot },
    /// To all members on join/leave.
    Players { room: RoomSnapshot },
    /// To all members on round start.
    Room { room: RoomSnapshot },
    /// Per-tick simulation snapshot while running.
    State {
        /// Server wall-clock timestamp (ms since epoch).
        t: u64,
        tick: u64,
        food: Option<Cell>,
        players: Vec<crate::PlayerSnapshot>,
    },
    /// A player was killed this step.
    Death {
        id: PlayerId,
        reason: DeathReason,
        respawn_at: u64,
    },
    /// A player re-entered the grid after its respawn deadline.
    Respawn {
        id: PlayerId,
        body: Vec<Cell>,
        dir: Dir,
    },
    /// Final broadcast when the round ends. No `state` follows it.
    Ended { room: RoomSnapshot },
    /// Echo of a client `ping`.
    Pong { t: u64 },
    /// Human-readable rejection (unknown room, full room, ...). The
    /// connection stays open.
    Error { message: String },
}
