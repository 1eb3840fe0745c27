//! The [`ScoreStore`] trait — the seam to the embedding app's score
//! persistence.
//!
//! When a player is knocked out, the room records their final score here.
//! The room never waits on the store: persistence runs on a detached task,
//! and a store failure is logged, not surfaced to players — the in-memory
//! game must not fall out of step with what players have already seen.

use knockout_protocol::{PlayerId, TournamentId};

/// Persists final scores for eliminated players.
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use std::sync::Mutex;
///
/// use knockout_protocol::{PlayerId, TournamentId};
/// use knockout_room::{ScoreError, ScoreStore};
///
/// /// Keeps best scores in memory. Fine for demos and tests.
/// #[derive(Default)]
/// struct MemoryScores {
///     best: Mutex<HashMap<PlayerId, i64>>,
/// }
///
/// impl ScoreStore for MemoryScores {
///     async fn record_score(
///         &self,
///         player_id: PlayerId,
///         score: i64,
///         _tournament: Option<TournamentId>,
///     ) -> Result<bool, ScoreError> {
///         let mut best = self.best.lock().unwrap();
///         let entry = best.entry(player_id).or_insert(i64::MIN);
///         let is_new_best = score > *entry;
///         if is_new_best {
///             *entry = score;
///         }
///         Ok(is_new_best)
///     }
/// }
/// ```
pub trait ScoreStore: Send + Sync + 'static {
    /// Records a final score, optionally tagged with a tournament.
    ///
    /// # Returns
    /// - `Ok(true)` — this is the player's new personal best
    /// - `Ok(false)` — recorded, but not a new best
    /// - `Err(ScoreError)` — the backend failed; the score is lost
    fn record_score(
        &self,
        player_id: PlayerId,
        score: i64,
        tournament: Option<TournamentId>,
    ) -> impl std::future::Future<Output = Result<bool, ScoreError>> + Send;
}

/// Errors a score backend can report.
#[derive(Debug, thiserror::Error)]
pub enum ScoreError {
    /// The backing store rejected or lost the write.
    #[error("score backend failure: {0}")]
    Backend(String),
}
