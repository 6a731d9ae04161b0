//! Players and matches.

use std::fmt;

use battleship_protocol::{MatchId, PlayerId};

use crate::{BoardId, MatchState};

/// A registered player.
///
/// The board is handed out the first time the player joins a match and
/// never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub board: Option<BoardId>,
}

impl Player {
    pub(crate) fn new(id: PlayerId) -> Self {
        Self { id, board: None }
    }
}

/// A game between two players.
///
/// Invariants:
/// - `turn` is `Some` exactly while the state is `InProgress`, and then
///   names one of the two participants
/// - `player2` is set once and never cleared
/// - `Finished` is terminal
#[derive(Debug, Clone)]
pub struct Match {
    pub(crate) id: MatchId,
    pub(crate) player1: PlayerId,
    pub(crate) player2: Option<PlayerId>,
    pub(crate) turn: Option<PlayerId>,
    pub(crate) state: MatchState,
}

impl Match {
    pub(crate) fn new(id: MatchId, creator: PlayerId) -> Self {
        Self {
            id,
            player1: creator,
            player2: None,
            turn: None,
            state: MatchState::WaitingForPlayers,
        }
    }

    pub fn id(&self) -> MatchId {
        self.id
    }

    /// The other participant, if `player` is in this match and the
    /// match has two players.
    pub fn opponent_of(&self, player: PlayerId) -> Option<PlayerId> {
        match self.player2 {
            Some(p2) if player == self.player1 => Some(p2),
            Some(p2) if player == p2 => Some(self.player1),
            _ => None,
        }
    }

    /// A read-only snapshot.
    pub fn info(&self) -> MatchInfo {
        MatchInfo {
            id: self.id,
            player1: Some(self.player1),
            player2: self.player2,
            turn: self.turn,
            state: self.state,
        }
    }
}

/// A snapshot of a match, detached from its lock.
///
/// `Display` renders the entry format `LIST_GAMES` sends:
/// `Match{id=1, p1=1, p2=-, turn=-, state=WAITING_FOR_PLAYERS}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchInfo {
    pub id: MatchId,
    pub player1: Option<PlayerId>,
    pub player2: Option<PlayerId>,
    pub turn: Option<PlayerId>,
    pub state: MatchState,
}

impl fmt::Display for MatchInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Match{{id={}, p1={}, p2={}, turn={}, state={}}}",
            self.id.0,
            OrDash(self.player1),
            OrDash(self.player2),
            OrDash(self.turn),
            self.state
        )
    }
}

/// Renders a player id as its bare number, or `-` when absent.
struct OrDash(Option<PlayerId>);

impl fmt::Display for OrDash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{}", id.0),
            None => write!(f, "-"),
        }
    }
}
