//! Identity resolution for Knockout.
//!
//! The coordinator never stores credentials and never trusts a
//! client-supplied identity. Instead, every connection opens with an opaque
//! session token, and an [`IdentityProvider`] — supplied by the embedding
//! application — resolves it to a stable [`Identity`]. All authorization
//! decisions downstream (who may start a game, who a score belongs to) use
//! that resolved identity, never anything from an event payload.
//!
//! # How it fits in the stack
//!
//! ```text
//! Room layer (above)   ← trusts PlayerId/username resolved here
//!     ↕
//! Session layer (this crate)
//!     ↕
//! Protocol layer (below)  ← provides PlayerId
//! ```

mod error;
mod identity;

pub use error::SessionError;
pub use identity::{Identity, IdentityProvider};
