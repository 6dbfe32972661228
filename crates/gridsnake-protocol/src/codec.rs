//! JSON codec helpers for WebSocket text frames.
//!
//! The transport carries UTF-8 text, so encoding produces a `String`
//! rather than bytes. Decoding is generic over the target type — the
//! server decodes [`crate::ClientMessage`], clients and tests decode
//! [`crate::ServerMessage`].

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Serializes a message into a JSON text frame.
pub fn encode<T: Serialize>(value: &T) -> Result<String, ProtocolError> {
    serde_json::to_string(value).map_err(ProtocolError::Encode)
}

/// Parses a JSON text frame into a message.
///
/// Callers on the high-frequency inbound path treat the `Err` case as
/// "drop the frame, keep the connection" per the error-handling design.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ProtocolError> {
    serde_json::from_str(text).map_err(ProtocolError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClientMessage, Dir};

    #[test]
    fn encode_decode_round_trip() {
        let msg = ClientMessage::Input {
            dir: Dir::DOWN,
            seq: 9,
        };
        let text = encode(&msg).unwrap();
        let decoded: ClientMessage = decode(&text).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn decode_garbage_is_an_error() {
        let result: Result<ClientMessage, _> = decode("not json at all");
        assert!(result.is_err());
    }

    #[test]
    fn decode_wrong_shape_is_an_error() {
        let result: Result<ClientMessage, _> = decode(r#"{"name":"hello"}"#);
        assert!(result.is_err());
    }
}
