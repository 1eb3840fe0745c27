//! # Knockout
//!
//! Real-time multiplayer room coordinator for last-player-standing games.
//!
//! Knockout owns the ephemeral, in-memory side of a game service: it
//! creates rooms identified by six-letter codes, tracks which players are
//! attached to which room over persistent WebSocket connections, serializes
//! concurrent membership changes per room, relays gameplay state between
//! participants, and declares a winner when eliminations leave one player
//! standing. Everything durable — accounts, scores, tournaments — belongs
//! to the embedding application and is reached through two seams:
//! [`IdentityProvider`](knockout_session::IdentityProvider) and
//! [`ScoreStore`](knockout_room::ScoreStore).
//!
//! Rooms do not survive a restart and are not meant to.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use knockout::prelude::*;
//! # use knockout_session::{Identity, IdentityProvider, SessionError};
//! # struct MyIdentity;
//! # impl IdentityProvider for MyIdentity {
//! #     async fn resolve_session(&self, s: &str) -> Result<Identity, SessionError> {
//! #         Ok(Identity { player_id: PlayerId(1), username: s.into() })
//! #     }
//! # }
//! # struct MyScores;
//! # impl ScoreStore for MyScores {
//! #     async fn record_score(&self, _: PlayerId, _: i64, _: Option<TournamentId>)
//! #         -> Result<bool, ScoreError> { Ok(false) }
//! # }
//!
//! # async fn run() -> Result<(), KnockoutError> {
//! let server = ServerBuilder::new()
//!     .bind("0.0.0.0:8080")
//!     .build(MyIdentity, Arc::new(MyScores))
//!     .await?;
//!
//! // The web layer creates rooms out-of-band and shows the code to the host.
//! let registry = server.registry();
//! let code = registry.create_room(PlayerId(1), "alice", None);
//! println!("room ready: {code}");
//!
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod router;
mod server;

pub use error::KnockoutError;
pub use router::{Binding, ConnectionRouter};
pub use server::{Server, ServerBuilder};

/// One-stop imports for embedding the coordinator.
pub mod prelude {
    pub use crate::{KnockoutError, Server, ServerBuilder};
    pub use knockout_protocol::{
        ClientEvent, Codec, JsonCodec, PlayerId, RoomCode, RosterEntry,
        ServerEvent, TournamentId,
    };
    pub use knockout_room::{
        RoomConfig, RoomError, RoomRegistry, RoomStatus, ScoreError,
        ScoreStore,
    };
    pub use knockout_session::{Identity, IdentityProvider, SessionError};
    pub use knockout_transport::ConnectionId;
}
