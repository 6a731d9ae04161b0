//! Unified error type for the battleship server.

use battleship_engine::EngineError;
use battleship_protocol::ProtocolError;
use battleship_session::SessionError;
use battleship_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically. Engine
/// and protocol errors are transparent: their text is what the client
/// sees after `ERROR `.
#[derive(Debug, thiserror::Error)]
pub enum BattleshipError {
    /// A transport-level error (accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A line that could not be parsed into a command.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (unknown connection, closed queue).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A game rule rejected the command.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The configuration file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid JSON for [`ServerConfig`](crate::ServerConfig).
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}
