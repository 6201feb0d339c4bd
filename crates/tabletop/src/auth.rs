//! Authentication hook for resolving a player's identity.
//!
//! Tabletop doesn't authenticate anyone itself. The handshake hands the
//! client's token to an [`Authenticator`] and trusts the [`PlayerId`] it
//! returns for the rest of the connection.

use std::future::Future;

use tabletop_protocol::PlayerId;

use crate::TabletopError;

/// Validates a client's token and returns their identity.
///
/// # Example
///
/// ```rust
/// use tabletop::{Authenticator, TabletopError};
/// use tabletop_protocol::PlayerId;
///
/// /// Uses the token itself as the player id. Development only.
/// struct NumericTokens;
///
/// impl Authenticator for NumericTokens {
///     async fn authenticate(&self, token: &str) -> Result<PlayerId, TabletopError> {
///         let id: u64 = token
///             .parse()
///             .map_err(|_| TabletopError::AuthFailed("token must be a number".into()))?;
///         Ok(PlayerId(id))
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Resolves `token` to a player.
    ///
    /// Called once per connection. A missing token arrives as `""`.
    ///
    /// # Errors
    /// [`TabletopError::AuthFailed`] if the token is invalid; the client
    /// gets a 401 and the connection is dropped.
    fn authenticate(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<PlayerId, TabletopError>> + Send;
}
