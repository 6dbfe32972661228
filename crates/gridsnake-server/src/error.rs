//! Unified error type for the server layer.

use gridsnake_protocol::ProtocolError;
use gridsnake_room::RoomError;

/// Top-level error wrapping the lower layers' errors, so `?` converts
/// them automatically in the accept loop and connection handlers.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Socket-level failure (bind, accept).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// WebSocket handshake or framing failure.
    #[error(transparent)]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Frame encode/decode failure.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Room-layer failure.
    #[error(transparent)]
    Room(#[from] RoomError),
}
