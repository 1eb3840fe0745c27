//! Connection router: which connection holds which seat.
//!
//! The router is the coordinator's only cross-room shared state besides
//! the registry itself. It maps live connections to their (room, player)
//! binding so that a raw transport disconnect can be turned into a detach
//! on the right room — and so a connection can never hold two seats.

use std::collections::HashMap;

use knockout_protocol::{PlayerId, RoomCode};
use knockout_transport::ConnectionId;

/// A connection's current seat: the room it is attached to and the player
/// occupying the seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// The room this connection is attached to.
    pub room: RoomCode,
    /// The authenticated player bound to the connection.
    pub player: PlayerId,
}

/// Tracks the binding of every attached connection.
///
/// Not thread-safe by itself — the server wraps it in a `Mutex`. Kept
/// plain here so the locking policy lives in one place.
#[derive(Debug, Default)]
pub struct ConnectionRouter {
    bindings: HashMap<ConnectionId, Binding>,
}

impl ConnectionRouter {
    /// Creates an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `connection` now holds `player`'s seat in `room`.
    /// A previous binding for the connection is replaced.
    pub fn bind(
        &mut self,
        connection: ConnectionId,
        room: RoomCode,
        player: PlayerId,
    ) {
        self.bindings.insert(connection, Binding { room, player });
    }

    /// Removes and returns the binding for `connection`, if any.
    /// A disconnect with no binding is a no-op.
    pub fn unbind(&mut self, connection: ConnectionId) -> Option<Binding> {
        self.bindings.remove(&connection)
    }

    /// Looks up the current binding for `connection`.
    pub fn binding(&self, connection: ConnectionId) -> Option<&Binding> {
        self.bindings.get(&connection)
    }

    /// Returns the number of bound connections.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if no connection is bound.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    #[test]
    fn test_bind_and_lookup() {
        let mut router = ConnectionRouter::new();
        router.bind(conn(1), RoomCode::from("ABCDEF"), PlayerId(42));

        let binding = router.binding(conn(1)).expect("should be bound");
        assert_eq!(binding.room, RoomCode::from("ABCDEF"));
        assert_eq!(binding.player, PlayerId(42));
        assert_eq!(router.len(), 1);
    }

    #[test]
    fn test_rebind_replaces_previous_binding() {
        let mut router = ConnectionRouter::new();
        router.bind(conn(1), RoomCode::from("AAAAAA"), PlayerId(1));
        router.bind(conn(1), RoomCode::from("BBBBBB"), PlayerId(1));

        let binding = router.binding(conn(1)).unwrap();
        assert_eq!(binding.room, RoomCode::from("BBBBBB"));
        assert_eq!(router.len(), 1, "a connection holds at most one seat");
    }

    #[test]
    fn test_unbind_returns_binding() {
        let mut router = ConnectionRouter::new();
        router.bind(conn(1), RoomCode::from("ABCDEF"), PlayerId(42));

        let binding = router.unbind(conn(1)).expect("should return binding");
        assert_eq!(binding.player, PlayerId(42));
        assert!(router.binding(conn(1)).is_none());
        assert!(router.is_empty());
    }

    #[test]
    fn test_unbind_unknown_connection_is_noop() {
        let mut router = ConnectionRouter::new();
        assert!(router.unbind(conn(99)).is_none());
    }

    #[test]
    fn test_bindings_are_per_connection() {
        let mut router = ConnectionRouter::new();
        router.bind(conn(1), RoomCode::from("ABCDEF"), PlayerId(1));
        router.bind(conn(2), RoomCode::from("ABCDEF"), PlayerId(2));

        router.unbind(conn(1));
        assert!(router.binding(conn(2)).is_some());
    }
}
