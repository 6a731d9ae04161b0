//! The session manager: tracks every live connection and which player,
//! if any, is bound to it.
//!
//! Responsibilities:
//! - Registering a session when a connection is accepted
//! - Binding a player to a connection (`CREATE_PLAYER` / `USE_PLAYER`)
//! - Enforcing "one live connection per player": binding a player that
//!   is already live elsewhere hands the displaced session back to the
//!   caller, who tells it and closes it
//! - Forgetting a connection when it goes away, without clobbering a
//!   newer binding for the same player
//!
//! # Concurrency note
//!
//! `SessionManager` is NOT thread-safe by itself; it uses plain
//! `HashMap`s. The server owns one behind a lock and keeps every
//! critical section short and free of I/O.

use std::collections::HashMap;

use battleship_protocol::PlayerId;
use battleship_transport::ConnectionId;

use crate::{Session, SessionError, SessionHandle, SessionState};

/// Registry of live sessions.
///
/// ## Lifecycle
///
/// ```text
/// register() ──→ identify() ──→ unregister()
///     │              │
///     ▼              ▼
/// [Connected]   [Identified(player)]
/// ```
#[derive(Debug, Default)]
pub struct SessionManager {
    /// All live sessions, keyed by connection.
    sessions: HashMap<ConnectionId, Session>,

    /// Which connection each bound player is live on. Kept in sync with
    /// the `Identified` states in `sessions`: a player maps to at most
    /// one connection.
    players: HashMap<PlayerId, ConnectionId>,
}

impl SessionManager {
    /// Creates a new, empty session manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a freshly accepted connection. No player is bound yet.
    pub fn register(&mut self, handle: SessionHandle) {
        let conn_id = handle.conn_id();
        self.sessions.insert(
            conn_id,
            Session {
                conn_id,
                state: SessionState::Connected,
                handle,
            },
        );
        tracing::debug!(%conn_id, "session registered");
    }

    /// Binds `player_id` to the connection `conn_id`.
    ///
    /// If the connection was bound to a different player, that binding
    /// is released. If the player was live on another connection, that
    /// session is unbound and its handle returned so the caller can tell
    /// it and close it.
    ///
    /// # Errors
    /// Returns [`SessionError::UnknownConnection`] if `conn_id` is not
    /// registered.
    pub fn identify(
        &mut self,
        conn_id: ConnectionId,
        player_id: PlayerId,
    ) -> Result<Option<SessionHandle>, SessionError> {
        let session = self
            .sessions
            .get_mut(&conn_id)
            .ok_or(SessionError::UnknownConnection(conn_id))?;

        if let SessionState::Identified(previous) = session.state {
            if previous != player_id
                && self.players.get(&previous) == Some(&conn_id)
            {
                self.players.remove(&previous);
            }
        }
        session.state = SessionState::Identified(player_id);

        let displaced = match self.players.insert(player_id, conn_id) {
            Some(other) if other != conn_id => {
                self.sessions.get_mut(&other).map(|old| {
                    old.state = SessionState::Connected;
                    old.handle.clone()
                })
            }
            _ => None,
        };

        match &displaced {
            Some(old) => tracing::info!(
                %conn_id,
                %player_id,
                replaced = %old.conn_id(),
                "player session replaced"
            ),
            None => tracing::info!(%conn_id, %player_id, "player identified"),
        }

        Ok(displaced)
    }

    /// Forgets a connection. The player binding is removed only if it
    /// still points at this connection.
    ///
    /// Returns the removed session, or `None` if it was not registered.
    pub fn unregister(&mut self, conn_id: ConnectionId) -> Option<Session> {
        let session = self.sessions.remove(&conn_id)?;
        if let SessionState::Identified(player_id) = session.state {
            if self.players.get(&player_id) == Some(&conn_id) {
                self.players.remove(&player_id);
            }
        }
        tracing::debug!(%conn_id, "session unregistered");
        Some(session)
    }

    /// The player bound to a connection, if any.
    pub fn player_of(&self, conn_id: ConnectionId) -> Option<PlayerId> {
        self.sessions
            .get(&conn_id)
            .and_then(|session| session.state.player())
    }

    /// The handle of the connection a player is live on, if any.
    pub fn handle_for_player(
        &self,
        player_id: PlayerId,
    ) -> Option<SessionHandle> {
        let conn_id = self.players.get(&player_id)?;
        self.sessions
            .get(conn_id)
            .map(|session| session.handle.clone())
    }

    /// Signals every live connection to close. Returns how many were
    /// signalled. Sessions stay registered until their handlers
    /// unregister them.
    pub fn close_all(&self) -> usize {
        for session in self.sessions.values() {
            session.handle.close();
        }
        self.sessions.len()
    }

    /// Number of live sessions, bound or not.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if there are no sessions.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Number of sessions with a player bound.
    pub fn identified_count(&self) -> usize {
        self.players.len()
    }
}

// =========================================================================
// Tests
// =========================================================================
