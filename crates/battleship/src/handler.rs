//! Per-connection handler: banner, command loop, and the writer task.
//!
//! Each accepted connection gets two Tokio tasks:
//!   1. This handler, which reads lines, runs commands and queues replies
//!   2. A writer, which drains the connection's outbound queue to the
//!      socket with a per-line timeout
//!
//! Replies and engine notifications share the outbound queue, so the
//! client sees them in the order they were produced.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;

use battleship_protocol::{
    Codec, Command, PlayerId, Reply, WELCOME_BANNER,
};
use battleship_session::{SessionError, SessionHandle};
use battleship_transport::{
    Connection, ConnectionId, TcpConnection, TransportError,
};
use tokio::sync::{mpsc, watch};
use tokio::task::AbortHandle;

use crate::BattleshipError;
use crate::server::ServerState;

/// Sent in place of the real error when a command fails unexpectedly.
const UNEXPECTED_ERROR: &str = "Unexpected server error";

/// Sent when a game command arrives before the connection has a player.
const NO_PLAYER: &str =
    "No player selected. Use CREATE_PLAYER or USE_PLAYER first.";

/// Sent to a connection whose player was taken over by another one.
const SESSION_REPLACED: &str = "Session replaced by a new connection.";

/// Handles a single connection from accept to close.
///
/// Returns once the client quits or disconnects, the server closes the
/// session (replacement or shutdown), or a read or write fails. Bad
/// input, over-long lines included, gets an `ERROR` reply and the loop
/// goes on. The session is unregistered and the socket closed on every
/// path.
pub(crate) async fn handle_connection(
    conn: TcpConnection,
    state: Arc<ServerState>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<(), BattleshipError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, peer = %conn.peer_addr(), "handling new connection");

    let (handle, outbound) =
        SessionHandle::new(conn_id, &state.config.session_config());
    state.sessions.lock().register(handle.clone());

    let write_timeout = state.config.write_timeout();
    let mut writer = tokio::spawn(write_outbound(
        Arc::clone(&conn),
        outbound,
        write_timeout,
    ));
    // The writer must not outlive this handler, even when it is aborted.
    let _writer_guard = AbortOnDrop(writer.abort_handle());
    let mut writer_done = false;
    let mut outcome = Ok(());

    for line in WELCOME_BANNER {
        if let Err(e) = handle.push(line.to_string()).await {
            outcome = Err(e.into());
        }
    }

    while outcome.is_ok() {
        let received = tokio::select! {
            _ = handle.closed() => {
                tracing::debug!(%conn_id, "session closed by server");
                break;
            }
            _ = shutdown.wait_for(|stop| *stop) => {
                break;
            }
            written = &mut writer => {
                writer_done = true;
                match written {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => outcome = Err(e.into()),
                    Err(e) => tracing::error!(%conn_id, error = %e, "writer task failed"),
                }
                break;
            }
            received = conn.recv_line() => received,
        };

        let line = match received {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::info!(%conn_id, "client disconnected");
                break;
            }
            Err(TransportError::LineTooLong(limit)) => {
                tracing::debug!(%conn_id, limit, "over-long line skipped");
                let reply = Reply::Error(format!("Line too long (max {limit} bytes)"));
                if let Err(e) = handle.push(state.codec.encode(&reply)).await {
                    outcome = Err(e.into());
                    break;
                }
                continue;
            }
            Err(e) => {
                outcome = Err(e.into());
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let (reply, quit) = dispatch(&state, conn_id, &line);
        if let Err(e) = handle.push(state.codec.encode(&reply)).await {
            outcome = Err(e.into());
            break;
        }
        if quit {
            tracing::info!(%conn_id, "client quit");
            break;
        }
    }

    // Dropping the last senders lets the writer flush what is queued
    // (a final BYE or ERROR) and stop.
    state.sessions.lock().unregister(conn_id);
    drop(handle);
    let drain = write_timeout.min(state.config.shutdown_grace());
    if !writer_done && tokio::time::timeout(drain, &mut writer).await.is_err() {
        tracing::debug!(%conn_id, "writer did not drain in time");
        writer.abort();
    }
    let _ = conn.close().await;

    tracing::debug!(%conn_id, "connection handler finished");
    outcome
}

/// Aborts the wrapped task when dropped.
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Writes queued lines until the queue closes or a write fails.
async fn write_outbound(
    conn: Arc<TcpConnection>,
    mut outbound: mpsc::Receiver<String>,
    write_timeout: Duration,
) -> Result<(), TransportError> {
    while let Some(line) = outbound.recv().await {
        tokio::time::timeout(write_timeout, conn.send_line(&line))
            .await
            .map_err(|_| TransportError::Timeout(write_timeout))??;
    }
    Ok(())
}

/// Parses and runs one line. Returns the reply and whether the client
/// asked to quit.
///
/// Business and parse errors become `ERROR <message>`. A panic inside a
/// command is logged and answered with a generic error; the connection
/// stays open either way.
fn dispatch(state: &ServerState, conn_id: ConnectionId, line: &str) -> (Reply, bool) {
    let command = match state.codec.decode(line) {
        Ok(command) => command,
        Err(e) => {
            tracing::debug!(%conn_id, error = %e, "bad command line");
            return (Reply::Error(e.to_string()), false);
        }
    };
    let quit = command == Command::Quit;
    let name = command.name();

    let player = state.sessions.lock().player_of(conn_id);
    let result = match player {
        None if command.requires_player() => {
            return (Reply::Error(NO_PLAYER.to_string()), false);
        }
        _ => catch_unwind(AssertUnwindSafe(|| {
            execute(state, conn_id, player, command)
        })),
    };

    let reply = match result {
        Ok(Ok(reply)) => reply,
        Ok(Err(BattleshipError::Engine(e))) => {
            tracing::debug!(%conn_id, command = name, kind = %e.kind(), error = %e, "command rejected");
            Reply::Error(e.to_string())
        }
        Ok(Err(e)) => {
            tracing::debug!(%conn_id, command = name, error = %e, "command rejected");
            Reply::Error(e.to_string())
        }
        Err(panic) => {
            let detail = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_default();
            tracing::error!(%conn_id, command = name, panic = %detail, "command panicked");
            Reply::Error(UNEXPECTED_ERROR.to_string())
        }
    };
    (reply, quit)
}

/// Runs a parsed command. `player` is `Some` for every command that
/// requires one.
fn execute(
    state: &ServerState,
    conn_id: ConnectionId,
    player: Option<PlayerId>,
    command: Command,
) -> Result<Reply, BattleshipError> {
    let game = &state.game;
    let require = || player.ok_or(SessionError::UnknownConnection(conn_id));

    let reply = match command {
        Command::CreatePlayer => {
            let id = game.create_player().id;
            bind_player(state, conn_id, id)?;
            Reply::Player(id)
        }
        Command::UsePlayer(id) => {
            game.player(id)?;
            bind_player(state, conn_id, id)?;
            Reply::Player(id)
        }
        Command::CreateGame => Reply::Game(game.create_match(require()?)?.id),
        Command::JoinGame(match_id) => {
            game.join_match(match_id, require()?)?;
            Reply::Joined(match_id)
        }
        Command::ListGames => Reply::Games(
            game.list_matches().iter().map(ToString::to_string).collect(),
        ),
        Command::PlaceShip(cells) => {
            let ship = game.place_ship(require()?, &cells)?;
            Reply::Ship {
                ship_id: ship.id(),
                size: ship.size(),
            }
        }
        Command::Shoot { match_id, target } => {
            Reply::Result(game.shoot(require()?, match_id, target)?.outcome)
        }
        Command::Help => Reply::Help,
        Command::Quit => Reply::Bye,
    };
    Ok(reply)
}

/// Binds `player` to this connection, evicting any other connection the
/// player was live on.
fn bind_player(
    state: &ServerState,
    conn_id: ConnectionId,
    player: PlayerId,
) -> Result<(), BattleshipError> {
    let displaced = state.sessions.lock().identify(conn_id, player)?;
    if let Some(old) = displaced {
        tracing::info!(%player, old = %old.conn_id(), new = %conn_id, "closing replaced session");
        let line = state.codec.encode(&Reply::Notify(SESSION_REPLACED.to_string()));
        let _ = old.notify(line);
        old.close();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ServerConfig, SessionNotifier};
    use battleship_engine::GameService;
    use battleship_protocol::TextCodec;
    use battleship_session::SessionManager;
    use parking_lot::Mutex;

    fn state() -> ServerState {
        let sessions = Arc::new(Mutex::new(SessionManager::new()));
        let config = ServerConfig::default();
        ServerState {
            game: Arc::new(GameService::new(
                config.engine.clone(),
                SessionNotifier::new(Arc::clone(&sessions)),
            )),
            sessions,
            codec: TextCodec,
            config,
        }
    }

    /// Registers a connection the way the handler does and returns its id.
    fn connect(state: &ServerState, id: u64) -> ConnectionId {
        let conn_id = ConnectionId::new(id);
        let (handle, _outbound) =
            SessionHandle::new(conn_id, &state.config.session_config());
        state.sessions.lock().register(handle);
        conn_id
    }

    #[test]
    fn test_dispatch_engine_error_replies_and_keeps_connection() {
        let state = state();
        let conn_id = connect(&state, 1);

        let (reply, quit) = dispatch(&state, conn_id, "USE_PLAYER 42");

        assert_eq!(reply, Reply::Error("Player not found: 42".into()));
        assert!(!quit);
    }

    #[test]
    fn test_dispatch_game_command_without_player_is_rejected() {
        let state = state();
        let conn_id = connect(&state, 1);

        let (reply, _) = dispatch(&state, conn_id, "CREATE_GAME");

        assert_eq!(reply, Reply::Error(NO_PLAYER.into()));
    }

    #[test]
    fn test_dispatch_create_player_binds_connection() {
        let state = state();
        let conn_id = connect(&state, 1);

        let (reply, _) = dispatch(&state, conn_id, "CREATE_PLAYER");

        assert_eq!(reply, Reply::Player(PlayerId(1)));
        assert_eq!(state.sessions.lock().player_of(conn_id), Some(PlayerId(1)));
    }

    #[test]
    fn test_dispatch_quit_says_bye() {
        let state = state();
        let conn_id = connect(&state, 1);

        assert_eq!(dispatch(&state, conn_id, "quit"), (Reply::Bye, true));
    }
}
