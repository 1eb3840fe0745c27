//! Room registry: owns the code → room mapping.
//!
//! The registry is the only component that creates and forgets rooms.
//! It hands out [`RoomHandle`]s for routing; all room state lives behind
//! those handles in the per-room actors.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use knockout_protocol::{PlayerId, RoomCode, TournamentId};
use rand::Rng;

use crate::room::spawn_room;
use crate::{RoomConfig, RoomHandle, ScoreStore};

/// The shared code → handle table.
///
/// Shared with every room actor so a dying room can retire its own entry
/// (host left, lobby emptied out) without a round trip through a reaper.
pub(crate) type RoomTable = Arc<RwLock<HashMap<RoomCode, RoomHandle>>>;

/// Creates, looks up, and destroys rooms.
///
/// Cheap to clone — clones share the same table, score store, and config.
/// Lookups take a read lock just long enough to clone a handle out; no
/// lock is ever held across an await.
pub struct RoomRegistry<S: ScoreStore> {
    rooms: RoomTable,
    scores: Arc<S>,
    config: RoomConfig,
}

impl<S: ScoreStore> Clone for RoomRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            rooms: Arc::clone(&self.rooms),
            scores: Arc::clone(&self.scores),
            config: self.config.clone(),
        }
    }
}

impl<S: ScoreStore> RoomRegistry<S> {
    /// Creates a new, empty registry.
    pub fn new(scores: Arc<S>, config: RoomConfig) -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            scores,
            config,
        }
    }

    /// Creates a room hosted by `host_id` and returns its code.
    ///
    /// The host is seated immediately but unattached; their connection
    /// binds when it sends `join_room`. Codes are drawn uniformly and
    /// redrawn on collision with a live room — unlikely at any sane room
    /// count, but handled rather than assumed away.
    pub fn create_room(
        &self,
        host_id: PlayerId,
        host_name: impl Into<String>,
        tournament: Option<TournamentId>,
    ) -> RoomCode {
        let mut rooms = self.rooms.write().expect("room table poisoned");

        let code = loop {
            let candidate = generate_room_code();
            if !rooms.contains_key(&candidate) {
                break candidate;
            }
        };

        let handle = spawn_room(
            code.clone(),
            host_id,
            host_name.into(),
            tournament,
            self.config.clone(),
            Arc::clone(&self.scores),
            Arc::clone(&self.rooms),
        );
        rooms.insert(code.clone(), handle);

        tracing::info!(%code, %host_id, "room created");
        code
    }

    /// Looks up a live room by code.
    pub fn get(&self, code: &RoomCode) -> Option<RoomHandle> {
        self.rooms
            .read()
            .expect("room table poisoned")
            .get(code)
            .cloned()
    }

    /// Removes a room. Idempotent — deleting an unknown code is a no-op.
    pub async fn delete_room(&self, code: &RoomCode) {
        let handle = {
            self.rooms
                .write()
                .expect("room table poisoned")
                .remove(code)
        };
        if let Some(handle) = handle {
            let _ = handle.shutdown().await;
            tracing::info!(%code, "room deleted");
        }
    }

    /// Returns the number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.read().expect("room table poisoned").len()
    }

    /// Lists the codes of all live rooms.
    pub fn codes(&self) -> Vec<RoomCode> {
        self.rooms
            .read()
            .expect("room table poisoned")
            .keys()
            .cloned()
            .collect()
    }
}

/// Draws six independent uniformly-random uppercase letters.
fn generate_room_code() -> RoomCode {
    let mut rng = rand::rng();
    let code: String = (0..RoomCode::LEN)
        .map(|_| rng.random_range(b'A'..=b'Z') as char)
        .collect();
    RoomCode::new(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_room_code_shape() {
        for _ in 0..100 {
            let code = generate_room_code();
            assert_eq!(code.as_str().len(), RoomCode::LEN);
            assert!(code.as_str().chars().all(|c| c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_generate_room_code_varies() {
        // Not a uniformity test — just a guard against a constant output.
        let first = generate_room_code();
        let distinct = (0..50).any(|_| generate_room_code() != first);
        assert!(distinct, "100 identical codes means the RNG is wired wrong");
    }
}
