//! Unified error type for the coordinator.

use knockout_protocol::ProtocolError;
use knockout_room::RoomError;
use knockout_session::SessionError;
use knockout_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum KnockoutError {
    /// A transport-level error (connection, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid event).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (unauthenticated, provider down).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room-level error (not found, not host, not joinable).
    #[error(transparent)]
    Room(#[from] RoomError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let top: KnockoutError = err.into();
        assert!(matches!(top, KnockoutError::Transport(_)));
        assert!(top.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidEvent("bad".into());
        let top: KnockoutError = err.into();
        assert!(matches!(top, KnockoutError::Protocol(_)));
    }

    #[test]
    fn test_from_session_error() {
        let err = SessionError::Unauthenticated;
        let top: KnockoutError = err.into();
        assert!(matches!(top, KnockoutError::Session(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::NotFound(knockout_protocol::RoomCode::from("ABCDEF"));
        let top: KnockoutError = err.into();
        assert!(matches!(top, KnockoutError::Room(_)));
    }
}
