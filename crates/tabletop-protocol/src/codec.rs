//! Codec trait and the JSON implementation.
//!
//! The server never touches `serde_json` directly; it goes through a
//! [`Codec`], so a binary format can be swapped in without touching the
//! connection handler.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Converts values to bytes and back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task for the server's lifetime.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if the value can't be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed or
    /// don't match `T`.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`. Frames are UTF-8 JSON, so they can be
/// sent as WebSocket text frames and read in browser dev tools.
///
/// ```rust
/// use tabletop_protocol::{Codec, Envelope, JsonCodec, Payload, SystemMessage};
///
/// let codec = JsonCodec;
/// let envelope = Envelope::new(
///     1,
///     5000,
///     Payload::System(SystemMessage::Heartbeat { client_time: 5000 }),
/// );
///
/// let bytes = codec.encode(&envelope).unwrap();
/// let decoded: Envelope = codec.decode(&bytes).unwrap();
/// assert_eq!(envelope, decoded);
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
