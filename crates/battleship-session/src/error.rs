//! Error types for the session layer.

use battleship_transport::ConnectionId;

/// Errors that can occur during session management.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session is registered for this connection. Either it was never
    /// registered or it has already been torn down.
    #[error("no session for connection {0}")]
    UnknownConnection(ConnectionId),

    /// The connection's outbound queue is full; the line was dropped.
    /// Only notifications can hit this, replies wait for room instead.
    #[error("outbound queue full for {0}")]
    QueueFull(ConnectionId),

    /// The connection's writer has stopped; nothing more can be sent.
    #[error("outbound queue closed for {0}")]
    QueueClosed(ConnectionId),
}
