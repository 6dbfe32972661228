//! Error types for the room layer.

use gridsnake_protocol::RoomCode;

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No room with this code exists.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// The room has no free player slots.
    #[error("room {0} is full")]
    RoomFull(RoomCode),

    /// The round is already running or ended; joins are lobby-only.
    #[error("room {0} already started")]
    RoundStarted(RoomCode),

    /// The room's command channel is closed (actor gone or shutting down).
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}
