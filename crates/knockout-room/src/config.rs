//! Room configuration and status machine.

use std::time::Duration;

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Configuration for room instances, shared by every room a registry spawns.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// How long a finished round lingers before the room returns to the
    /// waiting state and elimination flags are cleared.
    pub return_to_waiting_delay: Duration,

    /// Depth of each room's command channel. Senders wait when it fills,
    /// which is the registry's backpressure against a flooding client.
    pub command_buffer: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            return_to_waiting_delay: Duration::from_secs(5),
            command_buffer: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomStatus
// ---------------------------------------------------------------------------

/// The lifecycle status of a room.
///
/// ```text
/// Waiting --start(host)--> Playing --(last player standing, after delay)--> Waiting
/// ```
///
/// Same-state transitions (starting a playing room, reverting a waiting
/// room) are no-ops, not errors. Deletion is terminal and only ever
/// happens while `Waiting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    /// In the lobby: accepting joins, host may start.
    Waiting,
    /// A round is running: no new players, eliminations accumulate.
    Playing,
}

impl RoomStatus {
    /// Returns `true` if the room is accepting new players.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` if a round is in progress.
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::Playing => write!(f, "Playing"),
        }
    }
}
