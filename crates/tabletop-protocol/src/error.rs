//! Error types for the protocol layer.

/// Errors that can occur while encoding or decoding frames.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Deserialization failed: malformed JSON, a missing field, or a
    /// payload of the wrong shape.
    #[error("decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// The frame decoded but breaks a protocol rule, such as a command
    /// sent before the handshake.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
