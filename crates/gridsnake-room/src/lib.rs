//! Room lifecycle for gridsnake.
//!
//! Each room runs as an isolated Tokio task (actor model) owning one
//! [`gridsnake_game::RoomSim`] and its tick driver. The registry maps
//! five-character room codes to actor handles.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — creates/destroys rooms, resolves codes
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`PlayerSender`] — per-player outbound message channel

mod error;
mod registry;
mod room;

pub use error::RoomError;
pub use registry::{CODE_LEN, RoomRegistry};
pub use room::{PlayerSender, RoomHandle};
