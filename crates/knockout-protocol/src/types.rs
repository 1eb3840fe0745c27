//! Core wire types: identities, room codes, and the event vocabulary.
//!
//! Every event is internally tagged with an `event` field so the JSON on
//! the wire reads like the Socket.IO-style protocol the web client speaks:
//! `{"event": "join_room", "room_code": "ABCDEF"}`.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A stable identifier for a player, issued by the identity provider.
///
/// `#[serde(transparent)]` makes `PlayerId(42)` serialize as plain `42`,
/// which is what the client expects in `host_id` and roster entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Identifier of a tournament a recorded score may be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TournamentId(pub u64);

impl fmt::Display for TournamentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Room codes
// ---------------------------------------------------------------------------

/// A six-letter room code, e.g. `"ABCDEF"`.
///
/// Codes are unique among currently-live rooms only — a code may be reused
/// after its room is gone. Client-supplied codes are not validated here;
/// an unknown code simply fails the registry lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Number of characters in a generated code.
    pub const LEN: usize = 6;

    /// Wraps an arbitrary string as a room code.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

// ---------------------------------------------------------------------------
// Roster entries
// ---------------------------------------------------------------------------

/// One player as seen in roster broadcasts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// The player's stable identifier.
    pub id: PlayerId,
    /// Display name resolved at session time, fixed for the seat.
    pub username: String,
    /// Whether this player has been knocked out of the current round.
    pub eliminated: bool,
}

// ---------------------------------------------------------------------------
// Client → coordinator events
// ---------------------------------------------------------------------------

/// Events a client sends to the coordinator.
///
/// The first event on any connection must be `hello`; everything else
/// carries the room code it targets. Gameplay payloads (`game_state`) are
/// opaque JSON — the coordinator relays them without looking inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Presents the opaque session token for identity resolution.
    Hello { session: String },

    /// Attach this connection to a room (join, or reattach after a drop).
    JoinRoom { room_code: RoomCode },

    /// Ask for the room's current roster.
    GetPlayers { room_code: RoomCode },

    /// Host-only: move the room from waiting to playing.
    StartGame { room_code: RoomCode },

    /// Relay a gameplay state blob to everyone else in the room.
    GameUpdate {
        room_code: RoomCode,
        game_state: serde_json::Value,
    },

    /// Report this player's elimination with their final score.
    GameOver { room_code: RoomCode, score: i64 },
}

// ---------------------------------------------------------------------------
// Coordinator → client events
// ---------------------------------------------------------------------------

/// Events the coordinator sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Session resolved — here is who the coordinator thinks you are.
    Welcome { player_id: PlayerId, username: String },

    /// The roster changed (or was queried). `player` names the newcomer on
    /// join broadcasts and is absent on roster-query replies.
    PlayerJoined {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player: Option<RosterEntry>,
        players: Vec<RosterEntry>,
        host_id: PlayerId,
    },

    /// The request could not be honoured; room state is unaffected.
    Error { message: String },

    /// The host started the game.
    GameStarted,

    /// A relayed gameplay state blob from another player.
    GameUpdate {
        player_id: PlayerId,
        game_state: serde_json::Value,
    },

    /// A player was knocked out, with their final score.
    PlayerGameOver {
        player_id: PlayerId,
        username: String,
        score: i64,
    },

    /// Sent only to the last player standing.
    YouWin { username: String, score: i64 },

    /// The round is over; the room is back in the waiting state.
    ReturnToWaiting,

    /// A player's seat was removed (disconnect, not elimination).
    PlayerLeft { player_id: PlayerId, username: String },

    /// The room is gone (host left before the game started).
    RoomClosed { message: String },
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The web client parses these events by their `event` tag and field
    //! names, so the exact JSON shapes are load-bearing. Each test pins
    //! one shape; a serde-attribute change that breaks a client shows up
    //! here first.

    use super::*;

    fn entry(id: u64, name: &str) -> RosterEntry {
        RosterEntry {
            id: PlayerId(id),
            username: name.to_string(),
            eliminated: false,
        }
    }

    // =====================================================================
    // Identity types
    // =====================================================================

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&PlayerId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_player_id_deserializes_from_plain_number() {
        let pid: PlayerId = serde_json::from_str("42").unwrap();
        assert_eq!(pid, PlayerId(42));
    }

    #[test]
    fn test_player_id_display() {
        assert_eq!(PlayerId(7).to_string(), "P-7");
    }

    #[test]
    fn test_tournament_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&TournamentId(3)).unwrap();
        assert_eq!(json, "3");
    }

    // =====================================================================
    // RoomCode
    // =====================================================================

    #[test]
    fn test_room_code_serializes_as_plain_string() {
        let json = serde_json::to_string(&RoomCode::from("ABCDEF")).unwrap();
        assert_eq!(json, "\"ABCDEF\"");
    }

    #[test]
    fn test_room_code_display_and_as_str() {
        let code = RoomCode::from("QWERTY");
        assert_eq!(code.to_string(), "QWERTY");
        assert_eq!(code.as_str(), "QWERTY");
    }

    #[test]
    fn test_room_code_works_as_map_key() {
        use std::collections::HashMap;
        let mut map = HashMap::new();
        map.insert(RoomCode::from("AAAAAA"), 1);
        assert_eq!(map[&RoomCode::from("AAAAAA")], 1);
    }

    // =====================================================================
    // ClientEvent — wire shapes
    // =====================================================================

    #[test]
    fn test_client_event_hello_json_format() {
        let ev = ClientEvent::Hello {
            session: "tok-123".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&ev).unwrap();

        assert_eq!(json["event"], "hello");
        assert_eq!(json["session"], "tok-123");
    }

    #[test]
    fn test_client_event_join_room_json_format() {
        let ev = ClientEvent::JoinRoom {
            room_code: RoomCode::from("ABCDEF"),
        };
        let json: serde_json::Value = serde_json::to_value(&ev).unwrap();

        assert_eq!(json["event"], "join_room");
        assert_eq!(json["room_code"], "ABCDEF");
    }

    #[test]
    fn test_client_event_game_update_payload_is_opaque() {
        // Arbitrary nested JSON must survive untouched.
        let state = serde_json::json!({
            "board": [[0, 1], [2, 3]],
            "combo": {"x": 4}
        });
        let ev = ClientEvent::GameUpdate {
            room_code: RoomCode::from("ABCDEF"),
            game_state: state.clone(),
        };
        let bytes = serde_json::to_vec(&ev).unwrap();
        let decoded: ClientEvent = serde_json::from_slice(&bytes).unwrap();
        match decoded {
            ClientEvent::GameUpdate { game_state, .. } => {
                assert_eq!(game_state, state);
            }
            other => panic!("expected GameUpdate, got {other:?}"),
        }
    }

    #[test]
    fn test_client_event_game_over_round_trip() {
        let ev = ClientEvent::GameOver {
            room_code: RoomCode::from("ABCDEF"),
            score: 120,
        };
        let bytes = serde_json::to_vec(&ev).unwrap();
        let decoded: ClientEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(ev, decoded);
    }

    #[test]
    fn test_client_event_decodes_from_client_style_json() {
        // What the JS client actually sends.
        let raw = r#"{"event": "start_game", "room_code": "ZZZZZZ"}"#;
        let ev: ClientEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(
            ev,
            ClientEvent::StartGame {
                room_code: RoomCode::from("ZZZZZZ")
            }
        );
    }

    // =====================================================================
    // ServerEvent — wire shapes
    // =====================================================================

    #[test]
    fn test_server_event_welcome_json_format() {
        let ev = ServerEvent::Welcome {
            player_id: PlayerId(42),
            username: "alice".into(),
        };
        let json: serde_json::Value = serde_json::to_value(&ev).unwrap();

        assert_eq!(json["event"], "welcome");
        assert_eq!(json["player_id"], 42);
        assert_eq!(json["username"], "alice");
    }

    #[test]
    fn test_server_event_player_joined_with_newcomer() {
        let ev = ServerEvent::PlayerJoined {
            player: Some(entry(2, "bob")),
            players: vec![entry(1, "alice"), entry(2, "bob")],
            host_id: PlayerId(1),
        };
        let json: serde_json::Value = serde_json::to_value(&ev).unwrap();

        assert_eq!(json["event"], "player_joined");
        assert_eq!(json["player"]["id"], 2);
        assert_eq!(json["players"].as_array().unwrap().len(), 2);
        assert_eq!(json["host_id"], 1);
    }

    #[test]
    fn test_server_event_player_joined_omits_absent_newcomer() {
        // Roster-query replies carry no `player` field at all.
        let ev = ServerEvent::PlayerJoined {
            player: None,
            players: vec![entry(1, "alice")],
            host_id: PlayerId(1),
        };
        let json: serde_json::Value = serde_json::to_value(&ev).unwrap();

        assert!(json.get("player").is_none());
    }

    #[test]
    fn test_server_event_game_started_is_bare() {
        let json = serde_json::to_string(&ServerEvent::GameStarted).unwrap();
        assert_eq!(json, r#"{"event":"game_started"}"#);
    }

    #[test]
    fn test_server_event_player_game_over_json_format() {
        let ev = ServerEvent::PlayerGameOver {
            player_id: PlayerId(3),
            username: "carol".into(),
            score: 55,
        };
        let json: serde_json::Value = serde_json::to_value(&ev).unwrap();

        assert_eq!(json["event"], "player_game_over");
        assert_eq!(json["player_id"], 3);
        assert_eq!(json["username"], "carol");
        assert_eq!(json["score"], 55);
    }

    #[test]
    fn test_server_event_you_win_round_trip() {
        let ev = ServerEvent::YouWin {
            username: "alice".into(),
            score: 5,
        };
        let bytes = serde_json::to_vec(&ev).unwrap();
        let decoded: ServerEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(ev, decoded);
    }

    #[test]
    fn test_server_event_return_to_waiting_is_bare() {
        let json =
            serde_json::to_string(&ServerEvent::ReturnToWaiting).unwrap();
        assert_eq!(json, r#"{"event":"return_to_waiting"}"#);
    }

    #[test]
    fn test_server_event_room_closed_round_trip() {
        let ev = ServerEvent::RoomClosed {
            message: "Host has left the game".into(),
        };
        let bytes = serde_json::to_vec(&ev).unwrap();
        let decoded: ServerEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(ev, decoded);
    }

    // =====================================================================
    // Error cases — malformed input
    // =====================================================================

    #[test]
    fn test_decode_garbage_returns_error() {
        let garbage = b"not json at all";
        let result: Result<ClientEvent, _> = serde_json::from_slice(garbage);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_unknown_event_returns_error() {
        let unknown = r#"{"event": "fly_to_moon", "speed": 9000}"#;
        let result: Result<ClientEvent, _> = serde_json::from_str(unknown);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_missing_fields_returns_error() {
        let missing = r#"{"event": "join_room"}"#;
        let result: Result<ClientEvent, _> = serde_json::from_str(missing);
        assert!(result.is_err());
    }
}
