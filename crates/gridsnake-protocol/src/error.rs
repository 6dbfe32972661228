//! Error types for the protocol layer.

/// Errors that can occur while converting messages to or from JSON.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Deserialization failed: malformed JSON, an unknown message kind,
    /// or missing fields.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),
}
