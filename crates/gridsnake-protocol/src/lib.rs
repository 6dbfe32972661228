//! Wire protocol for Gridsnake.
//!
//! Defines every type that travels between server and client as a JSON
//! text frame:
//!
//! - **Types** ([`PlayerId`], [`RoomCode`], [`Cell`], [`Dir`], snapshots) —
//!   the structures embedded in messages.
//! - **Messages** ([`ClientMessage`], [`ServerMessage`]) — the tagged
//!   message enums, matched exhaustively by the server.
//! - **Codec** ([`encode`], [`decode`]) — JSON conversion helpers.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while converting.
//!
//! The protocol layer knows nothing about connections, rooms, or the
//! simulation — it only describes the wire format.

mod codec;
mod error;
mod messages;
mod types;

pub use codec::{decode, encode};
pub use error::ProtocolError;
pub use messages::{ClientMessage, DeathReason, ServerMessage};
pub use types::{
    Cell, Dir, PlayerId, PlayerSnapshot, RoomCode, RoomSnapshot, RoundPhase,
};
