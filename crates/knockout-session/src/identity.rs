//! The [`IdentityProvider`] trait — the seam to the embedding app's
//! account system.
//!
//! Knockout doesn't implement authentication itself. The web application
//! that hosts the coordinator already has sessions (cookies, JWTs, a users
//! table); this trait is the one async call the coordinator makes into it.
//! Production implementations look up the session store; tests and demos
//! use a stub that parses the token directly.

use knockout_protocol::PlayerId;

use crate::SessionError;

/// A resolved player identity: who a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// The player's stable identifier.
    pub player_id: PlayerId,
    /// Display name shown to other players. Immutable for the seat.
    pub username: String,
}

/// Resolves an opaque session token to a player identity.
///
/// `Send + Sync + 'static` because the provider is shared across all
/// connection tasks for the lifetime of the server.
///
/// # Example
///
/// ```rust
/// use knockout_session::{Identity, IdentityProvider, SessionError};
/// use knockout_protocol::PlayerId;
///
/// /// Accepts any numeric token and uses it as the player id.
/// /// Only for development — never use this in production!
/// struct DevIdentity;
///
/// impl IdentityProvider for DevIdentity {
///     async fn resolve_session(
///         &self,
///         session: &str,
///     ) -> Result<Identity, SessionError> {
///         let id: u64 = session
///             .parse()
///             .map_err(|_| SessionError::Unauthenticated)?;
///         Ok(Identity {
///             player_id: PlayerId(id),
///             username: format!("player-{id}"),
///         })
///     }
/// }
/// ```
pub trait IdentityProvider: Send + Sync + 'static {
    /// Resolves the given session token.
    ///
    /// # Returns
    /// - `Ok(Identity)` — the session is valid and belongs to this player
    /// - `Err(SessionError::Unauthenticated)` — unknown or expired session
    fn resolve_session(
        &self,
        session: &str,
    ) -> impl std::future::Future<Output = Result<Identity, SessionError>> + Send;
}
