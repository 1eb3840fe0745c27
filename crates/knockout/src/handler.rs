//! Per-connection handler: hello handshake, inbound dispatch, outbound
//! writer.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Receive `hello` → resolve the session through the identity provider
//!   2. Send `welcome` → spawn a writer task that owns the socket's send half
//!   3. Loop: receive events → dispatch to the right room actor
//!   4. On disconnect: release the binding and detach the seat
//!
//! Authorization identities always come from the resolved session, never
//! from event payloads — a client can name any room code, but it can only
//! ever act as the player its session belongs to.

use std::sync::Arc;
use std::time::Duration;

use knockout_protocol::{ClientEvent, Codec, RoomCode, ServerEvent};
use knockout_room::{EventSender, RoomError, RoomHandle, ScoreStore};
use knockout_session::{Identity, IdentityProvider};
use knockout_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::KnockoutError;

/// How long a fresh connection has to present its session.
const HELLO_TIMEOUT: Duration = Duration::from_secs(5);

/// Drop guard that releases a connection's seat when the handler exits.
///
/// Cleanup must happen even if the handler errors or panics. Since `Drop`
/// is synchronous, the guard spawns a fire-and-forget task for the async
/// unbind + detach.
struct DetachGuard<I: IdentityProvider, S: ScoreStore, C: Codec> {
    conn_id: ConnectionId,
    state: Arc<ServerState<I, S, C>>,
}

impl<I: IdentityProvider, S: ScoreStore, C: Codec> Drop
    for DetachGuard<I, S, C>
{
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let binding = state.router.lock().await.unbind(conn_id);
            let Some(binding) = binding else {
                return; // never attached anywhere — nothing to clean
            };
            let Some(handle) = state.registry.get(&binding.room) else {
                return; // room already gone
            };
            match handle.detach(conn_id).await {
                Ok(outcome) if outcome.room_deleted => {
                    tracing::debug!(
                        %conn_id,
                        room = %binding.room,
                        "room closed by disconnect"
                    );
                }
                _ => {}
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<I, S, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<I, S, C>>,
) -> Result<(), KnockoutError>
where
    I: IdentityProvider,
    S: ScoreStore,
    C: Codec,
{
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    // --- Step 1: hello / identity resolution ---
    let identity = match greet(&conn, &state).await {
        Ok(identity) => identity,
        Err(e) => {
            let _ = conn.close().await;
            return Err(e);
        }
    };
    tracing::info!(%conn_id, player_id = %identity.player_id, "session resolved");

    let _guard = DetachGuard {
        conn_id,
        state: Arc::clone(&state),
    };

    // --- Step 2: single-writer outbound path ---
    // Everything outbound (room fan-outs and direct replies alike) funnels
    // through one channel, so event order is exactly actor processing order.
    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<ServerEvent>();
    let writer_conn = conn.clone();
    let writer_state = Arc::clone(&state);
    tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            let bytes = match writer_state.codec.encode(&event) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to encode event");
                    continue;
                }
            };
            if writer_conn.send(&bytes).await.is_err() {
                break;
            }
        }
    });

    // --- Step 3: inbound loop ---
    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let event: ClientEvent = match state.codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode event");
                continue;
            }
        };

        dispatch(&state, conn_id, &identity, event, &events_tx).await;
    }

    // _guard drops here → seat released, binding cleared.
    Ok(())
}

/// Performs the hello handshake: resolve the session, send `welcome`.
async fn greet<I, S, C>(
    conn: &WebSocketConnection,
    state: &Arc<ServerState<I, S, C>>,
) -> Result<Identity, KnockoutError>
where
    I: IdentityProvider,
    S: ScoreStore,
    C: Codec,
{
    let data = match tokio::time::timeout(HELLO_TIMEOUT, conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(knockout_protocol::ProtocolError::InvalidEvent(
                "connection closed before hello".into(),
            )
            .into());
        }
        Ok(Err(e)) => return Err(KnockoutError::Transport(e)),
        Err(_) => {
            return Err(knockout_protocol::ProtocolError::InvalidEvent(
                "hello timed out".into(),
            )
            .into());
        }
    };

    let event: ClientEvent = state.codec.decode(&data)?;
    let ClientEvent::Hello { session } = event else {
        send_error_raw(conn, &state.codec, "Expected hello").await;
        return Err(knockout_protocol::ProtocolError::InvalidEvent(
            "first event must be hello".into(),
        )
        .into());
    };

    match state.identity.resolve_session(&session).await {
        Ok(identity) => {
            let welcome = ServerEvent::Welcome {
                player_id: identity.player_id,
                username: identity.username.clone(),
            };
            let bytes = state.codec.encode(&welcome)?;
            conn.send(&bytes).await.map_err(KnockoutError::Transport)?;
            Ok(identity)
        }
        Err(e) => {
            send_error_raw(conn, &state.codec, "Not authenticated").await;
            Err(KnockoutError::Session(e))
        }
    }
}

/// Routes one inbound event to the room actor it names.
async fn dispatch<I, S, C>(
    state: &Arc<ServerState<I, S, C>>,
    conn_id: ConnectionId,
    identity: &Identity,
    event: ClientEvent,
    events_tx: &EventSender,
) where
    I: IdentityProvider,
    S: ScoreStore,
    C: Codec,
{
    match event {
        ClientEvent::Hello { .. } => {
            tracing::debug!(%conn_id, "duplicate hello, ignoring");
        }

        ClientEvent::JoinRoom { room_code } => {
            join_room(state, conn_id, identity, room_code, events_tx).await;
        }

        ClientEvent::GetPlayers { room_code } => {
            let Some(handle) = state.registry.get(&room_code) else {
                send_error(events_tx, "Room not found");
                return;
            };
            match handle.snapshot().await {
                Ok(snapshot) => {
                    let _ = events_tx.send(ServerEvent::PlayerJoined {
                        player: None,
                        players: snapshot.players,
                        host_id: snapshot.host_id,
                    });
                }
                Err(_) => send_error(events_tx, "Room not found"),
            }
        }

        ClientEvent::StartGame { room_code } => {
            let Some(handle) = state.registry.get(&room_code) else {
                send_error(events_tx, "Room not found");
                return;
            };
            match handle.start(identity.player_id).await {
                Ok(()) => {}
                Err(RoomError::NotHost(_)) => {
                    send_error(events_tx, "Only the host can start the game");
                }
                Err(_) => send_error(events_tx, "Room not found"),
            }
        }

        ClientEvent::GameUpdate {
            room_code,
            game_state,
        } => {
            // Unknown room: dropped without a reply, matching the
            // fire-and-forget nature of the gameplay hot path.
            if let Some(handle) = state.registry.get(&room_code) {
                let _ = handle.relay(identity.player_id, game_state).await;
            }
        }

        ClientEvent::GameOver { room_code, score } => {
            if let Some(handle) = state.registry.get(&room_code) {
                let _ = handle.eliminate(identity.player_id, score).await;
            }
        }
    }
}

/// Attaches the connection to a room, releasing any previous seat first —
/// a connection holds at most one (room, player) binding at a time.
async fn join_room<I, S, C>(
    state: &Arc<ServerState<I, S, C>>,
    conn_id: ConnectionId,
    identity: &Identity,
    room_code: RoomCode,
    events_tx: &EventSender,
) where
    I: IdentityProvider,
    S: ScoreStore,
    C: Codec,
{
    let previous = state.router.lock().await.binding(conn_id).cloned();
    if let Some(previous) = previous {
        if previous.room != room_code {
            if let Some(old) = state.registry.get(&previous.room) {
                let _ = old.detach(conn_id).await;
            }
            state.router.lock().await.unbind(conn_id);
        }
    }

    let Some(handle) = state.registry.get(&room_code) else {
        send_error(events_tx, "Room not found");
        return;
    };

    let attached = attach(&handle, identity, conn_id, events_tx).await;
    match attached {
        Ok(()) => {
            state
                .router
                .lock()
                .await
                .bind(conn_id, room_code, identity.player_id);
        }
        Err(RoomError::NotJoinable(_)) => {
            send_error(events_tx, "Game has already started");
        }
        Err(_) => send_error(events_tx, "Room not found"),
    }
}

async fn attach(
    handle: &RoomHandle,
    identity: &Identity,
    conn_id: ConnectionId,
    events_tx: &EventSender,
) -> Result<(), RoomError> {
    handle
        .attach(
            identity.player_id,
            identity.username.clone(),
            conn_id,
            events_tx.clone(),
        )
        .await
}

/// Queues an `error` event for the offending connection only.
fn send_error(events_tx: &EventSender, message: &str) {
    let _ = events_tx.send(ServerEvent::Error {
        message: message.into(),
    });
}

/// Sends an `error` event directly, for use before the writer task exists.
async fn send_error_raw(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    message: &str,
) {
    if let Ok(bytes) = codec.encode(&ServerEvent::Error {
        message: message.into(),
    }) {
        let _ = conn.send(&bytes).await;
    }
}
