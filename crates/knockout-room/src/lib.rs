//! Room lifecycle management for Knockout.
//!
//! Each live room runs as an isolated Tokio task (actor model) owning its
//! roster, status, and elimination flags. All mutation of one room flows
//! through its command channel one operation at a time, so concurrent
//! joins, disconnects, and eliminations on the same room can never
//! interleave their read-modify-write. Distinct rooms share nothing and
//! run fully concurrently.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — owns the code → room mapping; creates/destroys rooms
//! - [`RoomHandle`] — send operations to a running room actor
//! - [`RoomStatus`] — waiting/playing state machine
//! - [`RoomConfig`] — room settings (return-to-waiting delay, etc.)
//! - [`ScoreStore`] — the seam to the embedding app's score persistence

mod config;
mod error;
mod registry;
mod room;
mod score;

pub use config::{RoomConfig, RoomStatus};
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::{DetachOutcome, EventSender, RoomHandle, RoomSnapshot};
pub use score::{ScoreError, ScoreStore};
