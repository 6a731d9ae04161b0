//! Error types for the protocol layer.
//!
//! A `ProtocolError` always means the client sent a line the server could
//! not turn into a [`Command`](crate::Command). They are reported back as
//! `ERROR <message>` and never close the connection.

/// Errors that can occur while parsing a command line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// The line held nothing but whitespace.
    #[error("empty command")]
    Empty,

    /// The first token is not a known command. Carries the token
    /// upper-cased, as the client will see it echoed back.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// Fewer arguments than the command needs.
    #[error("not enough arguments, usage: {usage}")]
    MissingArguments { usage: &'static str },

    /// An argument that should be a non-negative integer isn't one.
    #[error("invalid value for {label}: {value}")]
    InvalidNumber { label: &'static str, value: String },

    /// A ship coordinate that is not of the form `row,col`.
    #[error("invalid coordinate format: {0} (expected row,col)")]
    InvalidCoordinate(String),
}
