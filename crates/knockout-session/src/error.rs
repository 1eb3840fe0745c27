//! Error types for the session layer.

/// Errors that can occur while resolving a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session token is unknown, expired, or otherwise not tied to
    /// a player. The connection is refused; nothing else is affected.
    #[error("session is not authenticated")]
    Unauthenticated,

    /// The identity provider itself failed (backend down, timeout).
    /// Indistinguishable from `Unauthenticated` as far as the client is
    /// concerned, but logged differently server-side.
    #[error("identity provider failure: {0}")]
    Provider(String),
}
