//! Engine configuration and the match state machine.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Rules and dimensions the engine plays by.
///
/// Every field has a default, so a partial JSON object (or `{}`) is a
/// valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Rows on every board.
    pub board_rows: u32,

    /// Columns on every board.
    pub board_cols: u32,

    /// Who shoots first once a match starts.
    pub starting_turn: StartingTurn,

    /// Whether a hit lets the shooter go again.
    pub turn_rule: TurnRule,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            board_rows: 10,
            board_cols: 10,
            starting_turn: StartingTurn::Creator,
            turn_rule: TurnRule::AlternateEveryShot,
        }
    }
}

/// Who holds the first turn of a freshly started match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartingTurn {
    /// The player who created the match. Deterministic.
    #[default]
    Creator,
    /// Either player, with equal probability.
    Random,
}

/// How the turn moves after a resolved shot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRule {
    /// Water, hit and sink all pass the turn to the opponent.
    #[default]
    AlternateEveryShot,
    /// Water passes the turn; a hit or a sink keeps it.
    KeepTurnOnHit,
}

// ---------------------------------------------------------------------------
// MatchState
// ---------------------------------------------------------------------------

/// The lifecycle state of a match.
///
/// Transitions are strictly ordered, and a finished match stays finished:
///
/// ```text
/// WaitingForPlayers → InProgress → Finished
/// ```
///
/// - **WaitingForPlayers**: created, only the creator is in it.
/// - **InProgress**: a second player joined; shots are allowed and
///   exactly one participant holds the turn.
/// - **Finished**: one board has no floating ships left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchState {
    WaitingForPlayers,
    InProgress,
    Finished,
}

impl MatchState {
    /// Returns `true` if a second player may still join.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::WaitingForPlayers)
    }

    /// Returns `true` while shots are allowed.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress)
    }
}

impl std::fmt::Display for MatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WaitingForPlayers => write!(f, "WAITING_FOR_PLAYERS"),
            Self::InProgress => write!(f, "IN_PROGRESS"),
            Self::Finished => write!(f, "FINISHED"),
        }
    }
}
