//! Outbound notifications from the engine to players.

use std::sync::Arc;

use battleship_protocol::PlayerId;

/// Pushes free text to a player, out of band from command replies.
///
/// Implementations must not block: the engine calls this while a game
/// operation is completing. Delivery is best effort; a player with no
/// live connection simply misses the message.
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, player: PlayerId, message: &str);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, player: PlayerId, message: &str) {
        (**self).notify(player, message);
    }
}

/// Drops every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _player: PlayerId, _message: &str) {}
}
