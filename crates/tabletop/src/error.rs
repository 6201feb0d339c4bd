//! Unified error type for the Tabletop server.

use tabletop_game::GameError;
use tabletop_protocol::ProtocolError;
use tabletop_transport::TransportError;

/// Top-level error that wraps the errors of every layer.
///
/// Game rejections are normally answered with a `Rejected` reply and never
/// surface here; this type carries what ends a connection or stops the
/// server.
#[derive(Debug, thiserror::Error)]
pub enum TabletopError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, unexpected frame).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Game(#[from] GameError),

    /// The handshake token was refused by the [`Authenticator`](crate::Authenticator).
    #[error("authentication failed: {0}")]
    AuthFailed(String),
}
