//! Core protocol types: identities, coordinates, commands and replies.
//!
//! Everything a client can say to the server is a [`Command`]; everything
//! the server says back is a [`Reply`]. The [`Codec`](crate::Codec) turns
//! these into and out of text lines.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Newtype wrapper so a `MatchId` can never be passed where a `PlayerId`
/// is expected, even though both are `u64` underneath. `Display` writes
/// the bare number, exactly as clients send and receive it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a match (one game between two players).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MatchId(pub u64);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A ship identifier. Unique within the board that owns the ship.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ShipId(pub u64);

impl fmt::Display for ShipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Coordinate
// ---------------------------------------------------------------------------

/// A (row, column) position on a board, zero based.
///
/// Written `row,col` on the wire (`PLACE_SHIP 0,0 0,1`). Whether the
/// position actually lies on a board is the engine's business, not the
/// protocol's.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Coordinate {
    pub row: u32,
    pub col: u32,
}

impl Coordinate {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

impl FromStr for Coordinate {
    type Err = ProtocolError;

    /// Parses `row,col`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (row, col) = s
            .split_once(',')
            .ok_or_else(|| ProtocolError::InvalidCoordinate(s.to_string()))?;
        if col.contains(',') {
            return Err(ProtocolError::InvalidCoordinate(s.to_string()));
        }
        Ok(Self {
            row: parse_number(row.trim(), "row")?,
            col: parse_number(col.trim(), "column")?,
        })
    }
}

/// Parses a numeric argument, naming it in the error.
pub(crate) fn parse_number<T: FromStr>(
    value: &str,
    label: &'static str,
) -> Result<T, ProtocolError> {
    value.parse().map_err(|_| ProtocolError::InvalidNumber {
        label,
        value: value.to_string(),
    })
}

// ---------------------------------------------------------------------------
// ShotOutcome
// ---------------------------------------------------------------------------

/// What a single shot did.
///
/// The wire names are the historical ones clients already parse:
/// `AGUA` (water), `TOCADO` (hit), `HUNDIDO` (sunk).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShotOutcome {
    /// Nothing was there.
    Water,
    /// A ship was hit but still floats.
    Hit,
    /// The hit was the last intact cell of a ship.
    Sunk,
}

impl ShotOutcome {
    /// The token used on the wire.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Water => "AGUA",
            Self::Hit => "TOCADO",
            Self::Sunk => "HUNDIDO",
        }
    }
}

impl fmt::Display for ShotOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

// ---------------------------------------------------------------------------
// Command — client → server
// ---------------------------------------------------------------------------

/// A parsed client command. One line on the wire, one `Command`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `CREATE_PLAYER`: allocate a new player and bind it to this connection.
    CreatePlayer,
    /// `USE_PLAYER <playerId>`: bind an existing player to this connection.
    UsePlayer(PlayerId),
    /// `CREATE_GAME`: open a match with the bound player as creator.
    CreateGame,
    /// `JOIN_GAME <gameId>`: join an open match as second player.
    JoinGame(MatchId),
    /// `LIST_GAMES`: describe every match.
    ListGames,
    /// `PLACE_SHIP <row,col>...`: place one ship on the bound player's board.
    PlaceShip(Vec<Coordinate>),
    /// `SHOOT <gameId> <row> <col>`: fire at the opponent's board.
    Shoot {
        match_id: MatchId,
        target: Coordinate,
    },
    /// `HELP`: one-line command summary.
    Help,
    /// `QUIT`: say goodbye and close the connection.
    Quit,
}

impl Command {
    /// Returns `true` if the command needs a player bound to the
    /// connection before it can run.
    pub fn requires_player(&self) -> bool {
        matches!(
            self,
            Self::CreateGame
                | Self::JoinGame(_)
                | Self::PlaceShip(_)
                | Self::Shoot { .. }
        )
    }

    /// The canonical command token, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreatePlayer => "CREATE_PLAYER",
            Self::UsePlayer(_) => "USE_PLAYER",
            Self::CreateGame => "CREATE_GAME",
            Self::JoinGame(_) => "JOIN_GAME",
            Self::ListGames => "LIST_GAMES",
            Self::PlaceShip(_) => "PLACE_SHIP",
            Self::Shoot { .. } => "SHOOT",
            Self::Help => "HELP",
            Self::Quit => "QUIT",
        }
    }
}

// ---------------------------------------------------------------------------
// Reply — server → client
// ---------------------------------------------------------------------------

/// A line the server sends. Every command produces exactly one reply;
/// [`Reply::Notify`] lines are pushed asynchronously in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// `PLAYER <id>`
    Player(PlayerId),
    /// `GAME <id>`
    Game(MatchId),
    /// `JOINED <id>`
    Joined(MatchId),
    /// `GAMES` or `GAMES <m1> | <m2> | ...`. Entries are pre-rendered
    /// match summaries.
    Games(Vec<String>),
    /// `SHIP <id> SIZE <n>`
    Ship { ship_id: ShipId, size: usize },
    /// `RESULT <AGUA|TOCADO|HUNDIDO>`
    Result(ShotOutcome),
    /// `HELP <summary>`
    Help,
    /// `BYE`
    Bye,
    /// `ERROR <message>`
    Error(String),
    /// `NOTIFY <text>`
    Notify(String),
}

// =========================================================================
// Tests
// =========================================================================
