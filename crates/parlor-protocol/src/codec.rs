//! Codec trait and the JSON implementation.
//!
//! The server never serializes events by hand: it asks a [`Codec`] to turn
//! a [`ServerEvent`](crate::ServerEvent) into bytes and incoming bytes into
//! a [`ClientEvent`](crate::ClientEvent). Swapping the wire format means
//! swapping the codec, nothing else.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task the server spawns.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Browser clients speak JSON natively, and game-state payloads are
/// arbitrary JSON values, so this is the codec the server runs with.
///
/// ## Example
///
/// ```rust
/// use parlor_protocol::{ClientEvent, Codec, JsonCodec, RoomId};
///
/// let codec = JsonCodec;
///
/// let bytes = br#"{"event":"playerReady","data":{"roomId":"R1"}}"#;
/// let event: ClientEvent = codec.decode(bytes).unwrap();
/// assert_eq!(
///     event,
///     ClientEvent::PlayerReady { room_id: RoomId::from("R1") },
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClientEvent, ServerEvent};

    #[test]
    fn test_json_codec_encodes_server_event() {
        let bytes = JsonCodec.encode(&ServerEvent::StartGame).unwrap();
        assert_eq!(bytes, br#"{"event":"startGame"}"#);
    }

    #[test]
    fn test_json_codec_decode_garbage_is_decode_error() {
        let result: Result<ClientEvent, _> = JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_decode_unknown_event_is_decode_error() {
        let result: Result<ClientEvent, _> =
            JsonCodec.decode(br#"{"event":"flyToMoon","data":{}}"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
