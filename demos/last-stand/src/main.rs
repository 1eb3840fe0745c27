//! A runnable coordinator with throwaway collaborators.
//!
//! Sessions are `"<id>:<name>"` (or just `"<id>"`), scores live in a
//! HashMap. Point a WebSocket client at the printed address, `hello` with
//! a session, and join the lobby code printed at boot.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use knockout::prelude::*;

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Parses sessions of the form `"42:alice"` (or `"42"`, which names the
/// player `player-42`). Development only — any client can be anyone.
struct DevIdentity;

impl IdentityProvider for DevIdentity {
    async fn resolve_session(
        &self,
        session: &str,
    ) -> Result<Identity, SessionError> {
        let (id, name) = match session.split_once(':') {
            Some((id, name)) if !name.is_empty() => (id, Some(name)),
            _ => (session, None),
        };
        let id: u64 = id.parse().map_err(|_| SessionError::Unauthenticated)?;
        Ok(Identity {
            player_id: PlayerId(id),
            username: name
                .map(str::to_string)
                .unwrap_or_else(|| format!("player-{id}")),
        })
    }
}

/// Keeps each player's best score in memory.
#[derive(Default)]
struct MemoryScores {
    best: Mutex<HashMap<PlayerId, i64>>,
}

impl ScoreStore for MemoryScores {
    async fn record_score(
        &self,
        player_id: PlayerId,
        score: i64,
        tournament: Option<TournamentId>,
    ) -> Result<bool, ScoreError> {
        if let Some(tournament) = tournament {
            tracing::info!(%player_id, score, %tournament, "tournament score");
        }
        let mut best = self.best.lock().expect("score map poisoned");
        let entry = best.entry(player_id).or_insert(i64::MIN);
        let is_new_best = score > *entry;
        if is_new_best {
            *entry = score;
        }
        Ok(is_new_best)
    }
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let server = ServerBuilder::new()
        .bind("0.0.0.0:8080")
        .build(DevIdentity, Arc::new(MemoryScores::default()))
        .await?;

    // Seed one lobby so there is something to join straight away.
    let registry = server.registry();
    let code = registry.create_room(PlayerId(1), "host", None);
    println!("last-stand coordinator on 0.0.0.0:8080 — lobby code {code}");

    server.run().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dev_identity_parses_id_and_name() {
        let identity = DevIdentity
            .resolve_session("42:alice")
            .await
            .expect("should resolve");
        assert_eq!(identity.player_id, PlayerId(42));
        assert_eq!(identity.username, "alice");
    }

    #[tokio::test]
    async fn test_dev_identity_defaults_name_from_id() {
        let identity = DevIdentity
            .resolve_session("7")
            .await
            .expect("should resolve");
        assert_eq!(identity.username, "player-7");
    }

    #[tokio::test]
    async fn test_dev_identity_rejects_garbage() {
        let result = DevIdentity.resolve_session("no-such-session").await;
        assert!(matches!(result, Err(SessionError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_memory_scores_tracks_personal_best() {
        let scores = MemoryScores::default();

        assert!(scores.record_score(PlayerId(1), 10, None).await.unwrap());
        assert!(!scores.record_score(PlayerId(1), 5, None).await.unwrap());
        assert!(scores.record_score(PlayerId(1), 20, None).await.unwrap());
    }
}
