//! `BattleshipServer` builder, accept loop and shutdown.
//!
//! This is the entry point for running a battleship server. It ties
//! together all the layers: transport → protocol → session → engine.

use std::net::SocketAddr;
use std::sync::Arc;

use battleship_engine::GameService;
use battleship_protocol::TextCodec;
use battleship_session::SessionManager;
use battleship_transport::{Transport, TcpTransport};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};

use crate::handler::handle_connection;
use crate::{BattleshipError, ServerConfig, SessionNotifier};

/// Shared server state passed to each connection handler task.
///
/// The session manager is shared with the engine's notifier. Its lock is
/// never held across an `.await` or while calling into the engine.
pub(crate) struct ServerState {
    pub(crate) sessions: Arc<Mutex<SessionManager>>,
    pub(crate) game: Arc<GameService<SessionNotifier>>,
    pub(crate) codec: TextCodec,
    pub(crate) config: ServerConfig,
}

/// Builder for configuring a battleship server.
///
/// # Example
///
/// ```rust,no_run
/// use battleship::prelude::*;
///
/// # async fn example() -> Result<(), BattleshipError> {
/// let server = BattleshipServer::builder()
///     .bind("0.0.0.0:9090")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct BattleshipServerBuilder {
    config: ServerConfig,
    bind_addr: Option<String>,
}

impl BattleshipServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            bind_addr: None,
        }
    }

    /// Sets the address to bind to. Takes precedence over the address in
    /// [`config`](Self::config), whichever is called first.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = Some(addr.to_string());
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listening socket and sets up shared state. No
    /// connection is accepted until [`BattleshipServer::start`] or
    /// [`BattleshipServer::run`].
    pub async fn build(self) -> Result<BattleshipServer, BattleshipError> {
        let mut config = self.config;
        if let Some(addr) = self.bind_addr {
            config.bind_addr = addr;
        }

        let transport = TcpTransport::bind(&config.bind_addr).await?;

        let sessions = Arc::new(Mutex::new(SessionManager::new()));
        let game = Arc::new(GameService::new(
            config.engine.clone(),
            SessionNotifier::new(Arc::clone(&sessions)),
        ));
        let state = Arc::new(ServerState {
            sessions,
            game,
            codec: TextCodec,
            config,
        });

        Ok(BattleshipServer { transport, state })
    }
}

impl Default for BattleshipServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound battleship server.
///
/// Call [`start()`](Self::start) to serve in the background, or
/// [`run()`](Self::run) to serve in the current task.
pub struct BattleshipServer {
    transport: TcpTransport,
    state: Arc<ServerState>,
}

impl BattleshipServer {
    /// Creates a new builder.
    pub fn builder() -> BattleshipServerBuilder {
        BattleshipServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Spawns the accept loop and returns a handle to stop it.
    pub fn start(self) -> Result<ServerHandle, BattleshipError> {
        let local_addr = self.local_addr()?;
        let (shutdown, signal) = watch::channel(false);
        let state = Arc::clone(&self.state);
        let task = tokio::spawn(accept_loop(self.transport, self.state, signal));
        tracing::info!(%local_addr, "battleship server started");

        Ok(ServerHandle {
            local_addr,
            shutdown,
            task,
            state,
        })
    }

    /// Runs the accept loop in the current task until the process ends.
    pub async fn run(self) -> Result<(), BattleshipError> {
        let local_addr = self.local_addr()?;
        tracing::info!(%local_addr, "battleship server running");

        let (_shutdown, signal) = watch::channel(false);
        accept_loop(self.transport, self.state, signal).await;
        Ok(())
    }
}

/// Control handle for a server started with [`BattleshipServer::start`].
///
/// Dropping the handle without calling [`stop`](Self::stop) also shuts
/// the server down, without waiting for it.
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
    state: Arc<ServerState>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// The engine the server drives.
    pub fn game_service(&self) -> Arc<GameService<SessionNotifier>> {
        Arc::clone(&self.state.game)
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.state.sessions.lock().len()
    }

    /// Stops accepting, closes the listener and every live connection,
    /// and waits (up to the configured grace period) for connection
    /// tasks to finish. Match state is discarded with the server.
    pub async fn stop(self) {
        self.shutdown.send_replace(true);
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "accept loop ended abnormally");
        }
        tracing::info!(local_addr = %self.local_addr, "battleship server stopped");
    }
}

/// Accepts connections until `shutdown` flips to `true` (or its sender
/// goes away), then winds every connection down.
async fn accept_loop(
    mut transport: TcpTransport,
    state: Arc<ServerState>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut handlers = JoinSet::new();

    loop {
        // `wait_for` borrows `shutdown` for the whole `select!`, so each
        // handler gets its receiver from a clone taken beforehand.
        let conn_signal = shutdown.clone();
        tokio::select! {
            stop = shutdown.wait_for(|stop| *stop) => {
                if stop.is_err() {
                    tracing::debug!("server handle dropped");
                }
                break;
            }
            accepted = transport.accept() => match accepted {
                Ok(conn) => {
                    let state = Arc::clone(&state);
                    handlers.spawn(async move {
                        if let Err(e) = handle_connection(conn, state, conn_signal).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            },
            Some(joined) = handlers.join_next(), if !handlers.is_empty() => {
                if let Err(e) = joined {
                    tracing::error!(error = %e, "connection task failed");
                }
            }
        }
    }

    // Closes the listening socket.
    drop(transport);

    let (signalled, players) = {
        let sessions = state.sessions.lock();
        (sessions.close_all(), sessions.identified_count())
    };
    tracing::info!(connections = signalled, players, "closing live connections");

    let grace = state.config.shutdown_grace();
    let drained = tokio::time::timeout(grace, async {
        while handlers.join_next().await.is_some() {}
    })
    .await;
    if drained.is_err() {
        tracing::warn!(
            remaining = handlers.len(),
            "connections still open after grace period, aborting"
        );
        handlers.shutdown().await;
    }
}
