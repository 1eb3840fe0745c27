//! Error types for the room layer.
//!
//! Every variant is recoverable and local to the offending request —
//! nothing here is fatal to the process or to other rooms.

use knockout_protocol::{PlayerId, RoomCode};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No live room exists under this code.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// A player who isn't on the roster tried to join a room whose game
    /// has already started. Roster members may reattach at any time.
    #[error("room {0} is not joinable")]
    NotJoinable(RoomCode),

    /// Someone other than the host tried a host-only operation.
    #[error("player {0} is not the host")]
    NotHost(PlayerId),

    /// The room's command channel is closed — the room is being torn
    /// down. Callers treat this the same as the room not existing.
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}
