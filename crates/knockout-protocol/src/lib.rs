//! Wire protocol for Knockout.
//!
//! This crate defines the "language" that game clients and the coordinator
//! speak:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`RoomCode`], etc.) —
//!   the event structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those events are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the router
//! (player context). It doesn't know about connections or rooms — it only
//! knows how to serialize and deserialize events.
//!
//! ```text
//! Transport (bytes) → Protocol (ClientEvent/ServerEvent) → Router (binding)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    ClientEvent, PlayerId, RoomCode, RosterEntry, ServerEvent, TournamentId,
};
