//! Bridges engine notifications to live connections.

use std::sync::Arc;

use battleship_engine::Notifier;
use battleship_protocol::{Codec, PlayerId, Reply, TextCodec};
use battleship_session::SessionManager;
use parking_lot::Mutex;

/// Delivers engine notifications as `NOTIFY <text>` lines to whichever
/// connection the player is live on.
///
/// Never waits: a player with no connection, or a connection whose
/// queue is full, misses the message.
pub struct SessionNotifier {
    sessions: Arc<Mutex<SessionManager>>,
    codec: TextCodec,
}

impl SessionNotifier {
    pub fn new(sessions: Arc<Mutex<SessionManager>>) -> Self {
        Self {
            sessions,
            codec: TextCodec,
        }
    }
}

impl Notifier for SessionNotifier {
    fn notify(&self, player: PlayerId, message: &str) {
        let Some(handle) = self.sessions.lock().handle_for_player(player) else {
            tracing::trace!(%player, "no live connection, notification dropped");
            return;
        };
        let line = self.codec.encode(&Reply::Notify(message.to_string()));
        if let Err(e) = handle.notify(line) {
            tracing::debug!(%player, error = %e, "notification dropped");
        }
    }
}
