//! `Server` builder and accept loop.
//!
//! This is the entry point for running the coordinator. It ties the layers
//! together: transport → protocol → session → room.

use std::sync::Arc;

use knockout_protocol::{Codec, JsonCodec};
use knockout_room::{RoomConfig, RoomRegistry, ScoreStore};
use knockout_session::IdentityProvider;
use knockout_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::router::ConnectionRouter;
use crate::KnockoutError;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The registry
/// is internally shared; only the router needs a lock here.
pub(crate) struct ServerState<I, S: ScoreStore, C> {
    pub(crate) registry: RoomRegistry<S>,
    pub(crate) router: Mutex<ConnectionRouter>,
    pub(crate) identity: I,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a coordinator server.
///
/// # Example
///
/// ```rust,ignore
/// use knockout::prelude::*;
///
/// let server = ServerBuilder::new()
///     .bind("0.0.0.0:8080")
///     .build(my_identity_provider, my_score_store)
///     .await?;
/// server.run().await
/// ```
pub struct ServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
}

impl ServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            room_config: RoomConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the configuration applied to every room.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Builds the server with the given collaborators.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport` — the stack the browser
    /// client speaks.
    pub async fn build<I, S>(
        self,
        identity: I,
        scores: Arc<S>,
    ) -> Result<Server<I, S, JsonCodec>, KnockoutError>
    where
        I: IdentityProvider,
        S: ScoreStore,
    {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            registry: RoomRegistry::new(scores, self.room_config),
            router: Mutex::new(ConnectionRouter::new()),
            identity,
            codec: JsonCodec,
        });

        Ok(Server { transport, state })
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running coordinator server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct Server<I, S: ScoreStore, C> {
    transport: WebSocketTransport,
    state: Arc<ServerState<I, S, C>>,
}

impl<I, S, C> Server<I, S, C>
where
    I: IdentityProvider,
    S: ScoreStore,
    C: Codec,
{
    /// Creates a new builder.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns a handle to the room registry.
    ///
    /// This is the out-of-band creation path: the web layer calls
    /// [`RoomRegistry::create_room`] when a player asks to host, shows
    /// them the code, and the socket traffic takes it from there.
    pub fn registry(&self) -> RoomRegistry<S> {
        self.state.registry.clone()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), KnockoutError> {
        tracing::info!("Knockout coordinator running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection::<I, S, C>(conn, state).await
                        {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
