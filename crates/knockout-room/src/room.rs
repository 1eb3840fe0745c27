//! Room actor: an isolated Tokio task that owns one room.
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc channel. No shared mutable state — the roster, status,
//! and elimination flags are owned by the task, and commands are applied
//! one at a time in arrival order.

use std::collections::HashMap;
use std::sync::Arc;

use knockout_protocol::{PlayerId, RoomCode, RosterEntry, ServerEvent, TournamentId};
use knockout_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::registry::RoomTable;
use crate::{RoomConfig, RoomError, RoomStatus, ScoreStore};

/// Channel sender for delivering outbound events to one connection.
///
/// The connection handler hands one of these to the room at attach time
/// and drains the receiving end into the socket.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Operations sent to a room actor through its channel.
///
/// Variants with a `oneshot::Sender` are request/reply; the rest are
/// fire-and-forget so the gameplay hot path never waits on a round trip.
pub(crate) enum RoomCommand {
    /// Attach a connection to a seat: join, or reattach after a drop.
    Attach {
        player_id: PlayerId,
        username: String,
        connection: ConnectionId,
        sender: EventSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Request a snapshot of the roster and room metadata.
    Snapshot {
        reply: oneshot::Sender<RoomSnapshot>,
    },

    /// Host-only: move the room from waiting to playing.
    Start {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Relay an opaque gameplay payload to everyone but the sender.
    Relay {
        player_id: PlayerId,
        payload: serde_json::Value,
    },

    /// A player reports their own elimination with a final score.
    Eliminate { player_id: PlayerId, score: i64 },

    /// A connection dropped: remove the seat bound to it.
    Detach {
        connection: ConnectionId,
        reply: oneshot::Sender<DetachOutcome>,
    },

    /// Timer-driven: end the post-round lingering and go back to waiting.
    /// Ignored when stale (the round moved on or the room already reset).
    ReturnToWaiting { round: u64 },

    /// Tear the room down.
    Shutdown,
}

/// A point-in-time view of a room's roster and metadata.
#[derive(Debug, Clone)]
pub struct RoomSnapshot {
    /// Players in join order.
    pub players: Vec<RosterEntry>,
    /// The room's host. Fixed at creation.
    pub host_id: PlayerId,
    /// Current lifecycle status.
    pub status: RoomStatus,
}

/// What a detach did, so the router can clean up its own binding map.
#[derive(Debug, Clone)]
pub struct DetachOutcome {
    /// The player whose seat was removed, if the connection was bound.
    pub removed: Option<PlayerId>,
    /// `true` when the detach took the room down with it.
    pub room_deleted: bool,
}

/// Handle to a running room actor. Used to send operations to it.
///
/// Cheap to clone — it's just an `mpsc::Sender` wrapper. The
/// [`RoomRegistry`](crate::RoomRegistry) holds one of these per room.
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    pub(crate) sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Returns the room's code.
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Attaches a connection to a seat in the room.
    ///
    /// A player already on the roster gets their connection rebound
    /// (reconnect path, allowed at any status); anyone else is appended,
    /// which fails with [`RoomError::NotJoinable`] once the game started.
    pub async fn attach(
        &self,
        player_id: PlayerId,
        username: String,
        connection: ConnectionId,
        sender: EventSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Attach {
                player_id,
                username,
                connection,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?
    }

    /// Requests the current roster snapshot.
    pub async fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Asks the room to start its game on behalf of `player_id`.
    pub async fn start(&self, player_id: PlayerId) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Start {
                player_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?
    }

    /// Relays a gameplay payload from `player_id` (fire-and-forget).
    pub async fn relay(
        &self,
        player_id: PlayerId,
        payload: serde_json::Value,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Relay { player_id, payload })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Reports `player_id`'s elimination (fire-and-forget).
    pub async fn eliminate(
        &self,
        player_id: PlayerId,
        score: i64,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Eliminate { player_id, score })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Removes the seat bound to `connection`, if any.
    pub async fn detach(
        &self,
        connection: ConnectionId,
    ) -> Result<DetachOutcome, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Detach {
                connection,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }
}

/// One seat in a room.
struct Participant {
    player_id: PlayerId,
    username: String,
    /// The live connection currently bound to this seat. `None` until the
    /// player's transport attaches (the host between room creation and
    /// opening their socket).
    connection: Option<ConnectionId>,
    eliminated: bool,
}

impl Participant {
    fn entry(&self) -> RosterEntry {
        RosterEntry {
            id: self.player_id,
            username: self.username.clone(),
            eliminated: self.eliminated,
        }
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor<S: ScoreStore> {
    code: RoomCode,
    host_id: PlayerId,
    status: RoomStatus,
    /// Seats in join order. At most one per player id.
    roster: Vec<Participant>,
    /// Per-connection outbound channels.
    senders: HashMap<ConnectionId, EventSender>,
    /// Bumped on every game start; lets a queued return-to-waiting timer
    /// recognize that it belongs to a round that is already over.
    round: u64,
    config: RoomConfig,
    tournament: Option<TournamentId>,
    scores: Arc<S>,
    rooms: RoomTable,
    /// Our own command sender, used to schedule timer commands and to
    /// recognize our own registry entry when retiring.
    self_tx: mpsc::Sender<RoomCommand>,
    receiver: mpsc::Receiver<RoomCommand>,
    /// Set when the room has decided to die; the loop exits after the
    /// current command.
    closed: bool,
}

impl<S: ScoreStore> RoomActor<S> {
    /// Runs the actor loop, processing commands until the room dies.
    async fn run(mut self) {
        tracing::info!(code = %self.code, host = %self.host_id, "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Attach {
                    player_id,
                    username,
                    connection,
                    sender,
                    reply,
                } => {
                    let result = self
                        .handle_attach(player_id, username, connection, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Snapshot { reply } => {
                    let _ = reply.send(self.snapshot());
                }
                RoomCommand::Start { player_id, reply } => {
                    let result = self.handle_start(player_id);
                    let _ = reply.send(result);
                }
                RoomCommand::Relay { player_id, payload } => {
                    self.handle_relay(player_id, payload);
                }
                RoomCommand::Eliminate { player_id, score } => {
                    self.handle_eliminate(player_id, score);
                }
                RoomCommand::Detach { connection, reply } => {
                    let outcome = self.handle_detach(connection);
                    let _ = reply.send(outcome);
                }
                RoomCommand::ReturnToWaiting { round } => {
                    self.handle_return_to_waiting(round);
                }
                RoomCommand::Shutdown => {
                    tracing::info!(code = %self.code, "room shutting down");
                    self.closed = true;
                }
            }

            if self.closed {
                break;
            }
        }

        self.retire();
        tracing::info!(code = %self.code, "room actor stopped");
    }

    fn handle_attach(
        &mut self,
        player_id: PlayerId,
        username: String,
        connection: ConnectionId,
        sender: EventSender,
    ) -> Result<(), RoomError> {
        let seat = self
            .roster
            .iter()
            .position(|p| p.player_id == player_id);

        // Late joiners can't enter a running game, but a roster member may
        // reattach at any status to recover from a dropped connection.
        if seat.is_none() && !self.status.is_joinable() {
            return Err(RoomError::NotJoinable(self.code.clone()));
        }

        let joined = match seat {
            Some(i) => {
                let old = self.roster[i].connection.replace(connection);
                if let Some(old) = old {
                    if old != connection {
                        self.senders.remove(&old);
                    }
                }
                tracing::info!(
                    code = %self.code,
                    %player_id,
                    %connection,
                    "player reattached"
                );
                self.roster[i].entry()
            }
            None => {
                let participant = Participant {
                    player_id,
                    username,
                    connection: Some(connection),
                    eliminated: false,
                };
                let entry = participant.entry();
                self.roster.push(participant);
                tracing::info!(
                    code = %self.code,
                    %player_id,
                    players = self.roster.len(),
                    "player joined"
                );
                entry
            }
        };
        self.senders.insert(connection, sender);

        self.send_all(ServerEvent::PlayerJoined {
            player: Some(joined),
            players: self.entries(),
            host_id: self.host_id,
        });
        Ok(())
    }

    fn handle_start(&mut self, player_id: PlayerId) -> Result<(), RoomError> {
        if player_id != self.host_id {
            return Err(RoomError::NotHost(player_id));
        }
        // A redundant start on a playing room is success, not an error.
        if self.status.is_playing() {
            return Ok(());
        }

        self.status = RoomStatus::Playing;
        self.round += 1;
        // Every round starts with a clean slate, whatever happened to the
        // flags while the room sat in the lobby.
        for p in &mut self.roster {
            p.eliminated = false;
        }
        tracing::info!(
            code = %self.code,
            round = self.round,
            players = self.roster.len(),
            "game started"
        );
        self.send_all(ServerEvent::GameStarted);
        Ok(())
    }

    fn handle_relay(&mut self, player_id: PlayerId, payload: serde_json::Value) {
        let Some(seat) = self.roster.iter().find(|p| p.player_id == player_id)
        else {
            tracing::warn!(
                code = %self.code,
                %player_id,
                "game update from non-member, ignoring"
            );
            return;
        };

        let event = ServerEvent::GameUpdate {
            player_id,
            game_state: payload,
        };
        match seat.connection {
            Some(conn) => self.send_all_except(conn, event),
            None => self.send_all(event),
        }
    }

    fn handle_eliminate(&mut self, player_id: PlayerId, score: i64) {
        let Some(i) = self
            .roster
            .iter()
            .position(|p| p.player_id == player_id)
        else {
            tracing::warn!(
                code = %self.code,
                %player_id,
                "elimination for non-member, ignoring"
            );
            return;
        };

        let was_eliminated = self.roster[i].eliminated;
        self.roster[i].eliminated = true;
        let username = self.roster[i].username.clone();

        // Persist off the actor's critical path. A slow or failing store
        // must never delay or suppress what players see.
        let store = Arc::clone(&self.scores);
        let code = self.code.clone();
        let tournament = self.tournament;
        tokio::spawn(async move {
            match store.record_score(player_id, score, tournament).await {
                Ok(is_new_best) => tracing::debug!(
                    %code, %player_id, score, is_new_best, "score recorded"
                ),
                Err(e) => tracing::warn!(
                    %code, %player_id, score, error = %e, "score store failed"
                ),
            }
        });

        self.send_all(ServerEvent::PlayerGameOver {
            player_id,
            username,
            score,
        });

        // Only a flag that actually flipped can change the active count.
        if was_eliminated {
            return;
        }

        let mut active = self.roster.iter().filter(|p| !p.eliminated);
        match (active.next(), active.next()) {
            (Some(winner), None) => {
                tracing::info!(
                    code = %self.code,
                    winner = %winner.player_id,
                    "last player standing"
                );
                if let Some(conn) = winner.connection {
                    self.send_to(
                        conn,
                        ServerEvent::YouWin {
                            username: winner.username.clone(),
                            score,
                        },
                    );
                }
                self.schedule_return_to_waiting();
            }
            (None, _) => {
                // Double knockout: nobody left standing, no winner.
                tracing::info!(code = %self.code, "round ended with no winner");
                self.schedule_return_to_waiting();
            }
            _ => {}
        }
    }

    /// Arms the post-round timer. The timer task re-enters the command
    /// queue rather than touching room state, so a disconnect arriving
    /// during the delay window is processed normally, and a deleted room
    /// just closes the channel out from under the timer.
    fn schedule_return_to_waiting(&self) {
        let tx = self.self_tx.clone();
        let round = self.round;
        let delay = self.config.return_to_waiting_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(RoomCommand::ReturnToWaiting { round }).await;
        });
    }

    fn handle_return_to_waiting(&mut self, round: u64) {
        if round != self.round || !self.status.is_playing() {
            tracing::debug!(code = %self.code, round, "stale round reset, ignoring");
            return;
        }

        self.status = RoomStatus::Waiting;
        for p in &mut self.roster {
            p.eliminated = false;
        }
        tracing::info!(code = %self.code, "room returned to waiting");
        self.send_all(ServerEvent::ReturnToWaiting);

        // Everyone may have disconnected during the delay window; the
        // room could not die while playing, so it dies now.
        if self.roster.is_empty() {
            self.closed = true;
        }
    }

    fn handle_detach(&mut self, connection: ConnectionId) -> DetachOutcome {
        let Some(i) = self
            .roster
            .iter()
            .position(|p| p.connection == Some(connection))
        else {
            return DetachOutcome {
                removed: None,
                room_deleted: false,
            };
        };

        let seat = self.roster.remove(i);
        self.senders.remove(&connection);
        tracing::info!(
            code = %self.code,
            player_id = %seat.player_id,
            players = self.roster.len(),
            "player disconnected"
        );

        if seat.player_id == self.host_id && self.status.is_joinable() {
            self.send_all(ServerEvent::RoomClosed {
                message: "Host has left the game".into(),
            });
            self.closed = true;
            DetachOutcome {
                removed: Some(seat.player_id),
                room_deleted: true,
            }
        } else if self.roster.is_empty() && self.status.is_joinable() {
            self.closed = true;
            DetachOutcome {
                removed: Some(seat.player_id),
                room_deleted: true,
            }
        } else {
            self.send_all(ServerEvent::PlayerLeft {
                player_id: seat.player_id,
                username: seat.username,
            });
            DetachOutcome {
                removed: Some(seat.player_id),
                room_deleted: false,
            }
        }
    }

    fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            players: self.entries(),
            host_id: self.host_id,
            status: self.status,
        }
    }

    fn entries(&self) -> Vec<RosterEntry> {
        self.roster.iter().map(Participant::entry).collect()
    }

    /// Sends an event to every connection in the room.
    fn send_all(&self, event: ServerEvent) {
        for sender in self.senders.values() {
            let _ = sender.send(event.clone());
        }
    }

    /// Sends an event to every connection except one (the originator).
    fn send_all_except(&self, excluded: ConnectionId, event: ServerEvent) {
        for (conn, sender) in &self.senders {
            if *conn != excluded {
                let _ = sender.send(event.clone());
            }
        }
    }

    /// Sends an event to a single connection. Silently drops if the
    /// receiver is gone (connection handler already exited).
    fn send_to(&self, connection: ConnectionId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&connection) {
            let _ = sender.send(event);
        }
    }

    /// Removes this room's registry entry, unless the code has already
    /// been taken over by a newer room.
    fn retire(&self) {
        let mut rooms = self.rooms.write().expect("room table poisoned");
        let ours = rooms
            .get(&self.code)
            .is_some_and(|h| h.sender.same_channel(&self.self_tx));
        if ours {
            rooms.remove(&self.code);
        }
    }
}

/// Spawns a new room actor task and returns a handle to communicate
/// with it. The roster starts with the host seated but unattached.
pub(crate) fn spawn_room<S: ScoreStore>(
    code: RoomCode,
    host_id: PlayerId,
    host_name: String,
    tournament: Option<TournamentId>,
    config: RoomConfig,
    scores: Arc<S>,
    rooms: RoomTable,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.command_buffer);

    let actor = RoomActor {
        code: code.clone(),
        host_id,
        status: RoomStatus::Waiting,
        roster: vec![Participant {
            player_id: host_id,
            username: host_name,
            connection: None,
            eliminated: false,
        }],
        senders: HashMap::new(),
        round: 0,
        config,
        tournament,
        scores,
        rooms,
        self_tx: tx.clone(),
        receiver: rx,
        closed: false,
    };

    tokio::spawn(actor.run());

    RoomHandle { code, sender: tx }
}
