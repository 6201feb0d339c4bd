//! `TabletopServer` builder and server loop.
//!
//! This is the entry point for running a Tabletop server. It wires the
//! layers together: transport → protocol → game engine, with the broadcast
//! dispatcher feeding events back out through the connection registry.

use std::future::Future;
use std::sync::Arc;

use tabletop_broadcast::{ConnectionRegistry, Dispatcher};
use tabletop_game::{GameEngine, GameStore};
use tabletop_protocol::{Codec, GameEvent, JsonCodec};
use tabletop_rules::{GameRule, RuleRegistry};
use tabletop_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{Authenticator, ServerConfig, TabletopError};

/// The current protocol version. Clients must send this in their
/// handshake or be rejected.
pub const PROTOCOL_VERSION: u32 = 1;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<S: GameStore, A: Authenticator, C: Codec> {
    pub(crate) engine: GameEngine<S>,
    pub(crate) registry: ConnectionRegistry<GameEvent>,
    pub(crate) auth: A,
    pub(crate) codec: C,
    pub(crate) config: ServerConfig,
}

/// Builder for configuring and starting a Tabletop server.
///
/// Tic-tac-toe is registered by default; add more games with
/// [`rule`](Self::rule).
///
/// ```rust,ignore
/// let server = TabletopServer::builder()
///     .bind("0.0.0.0:8080")
///     .rule(TicTacToe::new("gomoku", 15, 5))
///     .build(my_auth, MemoryStore::new())
///     .await?;
/// server.run().await
/// ```
pub struct TabletopServerBuilder {
    config: ServerConfig,
    rules: RuleRegistry,
}

impl TabletopServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            rules: RuleRegistry::with_defaults(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Replaces the whole configuration, bind address included.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers one more game rule under its own name.
    pub fn rule(mut self, rule: impl GameRule) -> Self {
        self.rules.register(rule);
        self
    }

    /// Replaces the rule registry.
    pub fn rules(mut self, rules: RuleRegistry) -> Self {
        self.rules = rules;
        self
    }

    /// Binds the listener and starts the broadcast dispatcher.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`. Must be called from
    /// within a Tokio runtime.
    pub async fn build<S, A>(
        self,
        auth: A,
        store: S,
    ) -> Result<TabletopServer<S, A, JsonCodec>, TabletopError>
    where
        S: GameStore,
        A: Authenticator,
    {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;

        let registry = ConnectionRegistry::new();
        let dispatcher = Dispatcher::start(registry.clone());
        let engine = GameEngine::new(store, self.rules, dispatcher.publisher());

        tracing::info!(
            addr = %self.config.bind_addr,
            games = ?engine.rules().tags(),
            "server built"
        );

        let state = Arc::new(ServerState {
            engine,
            registry,
            auth,
            codec: JsonCodec,
            config: self.config,
        });

        Ok(TabletopServer {
            transport,
            state,
            dispatcher,
        })
    }
}

impl Default for TabletopServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Tabletop server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct TabletopServer<S: GameStore, A: Authenticator, C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<S, A, C>>,
    dispatcher: Dispatcher<GameEvent>,
}

impl<S, A, C> TabletopServer<S, A, C>
where
    S: GameStore,
    A: Authenticator,
    C: Codec,
{
    /// Creates a new builder.
    pub fn builder() -> TabletopServerBuilder {
        TabletopServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// The engine behind the connections, for in-process callers.
    pub fn engine(&self) -> &GameEngine<S> {
        &self.state.engine
    }

    /// Players with a live connection.
    pub fn registry(&self) -> &ConnectionRegistry<GameEvent> {
        &self.state.registry
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), TabletopError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `shutdown` resolves, then stops the
    /// broadcast dispatcher.
    ///
    /// Connections already accepted keep running on their own tasks; they
    /// stop receiving events once the dispatcher is gone.
    pub async fn run_until(
        mut self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), TabletopError> {
        tracing::info!("Tabletop server running");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;
                () = &mut shutdown => break,
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(error = %e, "connection ended with error");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept failed");
                    }
                },
            }
        }

        let stats = self.dispatcher.shutdown().await;
        tracing::info!(
            delivered = stats.delivered,
            dropped = stats.dropped,
            "Tabletop server stopped"
        );
        Ok(())
    }
}
