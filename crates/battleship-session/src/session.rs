//! Session types: the server's record of one live connection.
//!
//! A session tracks:
//! - WHICH connection it is (`ConnectionId`)
//! - WHO is playing on it, if anyone yet (`SessionState`)
//! - HOW to reach it (`SessionHandle`: outbound queue + close signal)

use std::sync::Arc;

use battleship_protocol::PlayerId;
use battleship_transport::ConnectionId;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, watch};

use crate::SessionError;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How many lines may wait in a connection's outbound queue.
    ///
    /// Replies wait for room; notifications are dropped once the queue
    /// is full, so a stalled client never stalls the game.
    pub outbound_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            outbound_capacity: 64,
        }
    }
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// Where a connection is in its (short) lifecycle.
///
/// ```text
/// Connected ──CREATE_PLAYER / USE_PLAYER──→ Identified(player)
///                                              │
///                                 USE_PLAYER ──┘ (rebinds)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Socket is up, no player bound yet.
    Connected,
    /// A player is bound; game commands are allowed.
    Identified(PlayerId),
}

impl SessionState {
    /// The bound player, if any.
    pub fn player(&self) -> Option<PlayerId> {
        match self {
            Self::Connected => None,
            Self::Identified(player_id) => Some(*player_id),
        }
    }
}

/// A registered connection.
#[derive(Debug)]
pub struct Session {
    pub conn_id: ConnectionId,
    pub state: SessionState,
    pub handle: SessionHandle,
}

// ---------------------------------------------------------------------------
// SessionHandle
// ---------------------------------------------------------------------------

/// Cheap, cloneable handle for talking to one connection.
///
/// Lines pushed here are written to the socket, in order, by the
/// connection's writer task. Replies and notifications share the queue so
/// a client always sees them in the order they were produced.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    conn_id: ConnectionId,
    outbound: mpsc::Sender<String>,
    close: Arc<watch::Sender<bool>>,
}

impl SessionHandle {
    /// Creates a handle and the receiving end its writer task drains.
    pub fn new(
        conn_id: ConnectionId,
        config: &SessionConfig,
    ) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(config.outbound_capacity.max(1));
        let (close, _) = watch::channel(false);
        let handle = Self {
            conn_id,
            outbound: tx,
            close: Arc::new(close),
        };
        (handle, rx)
    }

    /// The connection this handle belongs to.
    pub fn conn_id(&self) -> ConnectionId {
        self.conn_id
    }

    /// Queues a command reply, waiting for room if the queue is full.
    ///
    /// # Errors
    /// [`SessionError::QueueClosed`] if the writer has gone away.
    pub async fn push(&self, line: String) -> Result<(), SessionError> {
        self.outbound
            .send(line)
            .await
            .map_err(|_| SessionError::QueueClosed(self.conn_id))
    }

    /// Queues a notification without waiting.
    ///
    /// # Errors
    /// [`SessionError::QueueFull`] when the client is not keeping up,
    /// [`SessionError::QueueClosed`] when the writer has gone away. In
    /// both cases the line is dropped.
    pub fn notify(&self, line: String) -> Result<(), SessionError> {
        self.outbound.try_send(line).map_err(|e| match e {
            TrySendError::Full(_) => SessionError::QueueFull(self.conn_id),
            TrySendError::Closed(_) => SessionError::QueueClosed(self.conn_id),
        })
    }

    /// Asks the connection's handler to shut the connection down.
    /// Idempotent.
    pub fn close(&self) {
        self.close.send_replace(true);
    }

    /// Returns `true` once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        *self.close.borrow()
    }

    /// Resolves when [`close`](Self::close) is called.
    pub async fn closed(&self) {
        let mut rx = self.close.subscribe();
        // The sender lives in `self`, so this only returns once closed.
        let _ = rx.wait_for(|closed| *closed).await;
    }
}
