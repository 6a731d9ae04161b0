//! Error types for the engine layer.
//!
//! Messages are written for the player on the other end of the socket:
//! the server sends them verbatim after `ERROR `. Ids are rendered as
//! the bare numbers the client used.

use battleship_protocol::{Coordinate, MatchId, PlayerId};

/// The three classes of business failure.
///
/// The server treats all of them the same way (an `ERROR` reply, the
/// connection stays open); the class is kept for logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced player or match does not exist.
    NotFound,
    /// The input itself is wrong, whatever the game state.
    InvalidArgument,
    /// The input is fine but the game is not in a state that allows it.
    InvalidState,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::InvalidArgument => write!(f, "invalid_argument"),
            Self::InvalidState => write!(f, "invalid_state"),
        }
    }
}

/// Errors that can occur during engine operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    /// The match already has its second player.
    #[error("Match {0} already has two players")]
    MatchFull(MatchId),

    /// The creator tried to join their own match.
    #[error("Player {0} is already in match {1}")]
    AlreadyInMatch(PlayerId, MatchId),

    /// Boards are handed out on join; this player has not joined yet.
    #[error("Player {0} has no board yet; join a match first")]
    NoBoard(PlayerId),

    #[error("Match {0} is not in progress")]
    MatchNotInProgress(MatchId),

    #[error("Not your turn")]
    NotYourTurn,

    #[error("Match {0} has no opponent for player {1}")]
    NoOpponent(MatchId, PlayerId),

    #[error("Coordinate {0} is outside the board")]
    OutOfBounds(Coordinate),

    #[error("Cell {0} was already shot")]
    AlreadyShot(Coordinate),

    #[error("A ship needs at least one cell")]
    EmptyPlacement,

    #[error("Duplicate coordinate {0}")]
    DuplicateCoordinate(Coordinate),

    #[error("Cell {0} is already occupied by a ship")]
    CellOccupied(Coordinate),

    /// Cells neither share a row nor share a column.
    #[error("Ship cells must share a row or a column")]
    NotStraight,

    /// Cells are in a line but with a gap.
    #[error("Ship cells must be contiguous")]
    NotContiguous,
}

impl EngineError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PlayerNotFound(_) | Self::MatchNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::AlreadyInMatch(..)
            | Self::OutOfBounds(_)
            | Self::EmptyPlacement
            | Self::DuplicateCoordinate(_)
            | Self::CellOccupied(_)
            | Self::NotStraight
            | Self::NotContiguous => ErrorKind::InvalidArgument,
            Self::MatchFull(_)
            | Self::NoBoard(_)
            | Self::MatchNotInProgress(_)
            | Self::NotYourTurn
            | Self::NoOpponent(..)
            | Self::AlreadyShot(_) => ErrorKind::InvalidState,
        }
    }
}
