//! WebSocket server for gridsnake.
//!
//! Wires the layers together: each accepted socket gets a connection
//! handler task ([`handler`]), rooms run as actors behind the shared
//! [`gridsnake_room::RoomRegistry`], and every frame on the wire is a
//! JSON-encoded [`gridsnake_protocol::ClientMessage`] or
//! [`gridsnake_protocol::ServerMessage`].

mod error;
mod handler;
mod server;

pub use error::ServerError;
pub use server::GameServer;
