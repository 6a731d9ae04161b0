//! Codec trait and the text implementation used on the wire.
//!
//! A codec converts between protocol types and lines. The server only
//! depends on the [`Codec`] trait, so the command syntax can change (or
//! a second dialect can be added) without touching connection handling.
//!
//! [`TextCodec`] implements the line protocol clients speak today:
//!
//! ```text
//! CREATE_PLAYER                -> PLAYER 1
//! CREATE_GAME                  -> GAME 1
//! PLACE_SHIP 0,0 0,1           -> SHIP 1 SIZE 2
//! SHOOT 1 5 5                  -> RESULT TOCADO
//! bogus                        -> ERROR Unknown command: BOGUS
//! ```

use crate::types::parse_number;
use crate::{Command, Coordinate, MatchId, PlayerId, ProtocolError, Reply};

/// The two lines sent to every client right after it connects.
pub const WELCOME_BANNER: [&str; 2] =
    ["WELCOME Battleship TCP", "Type HELP for available commands."];

/// Command summary returned by `HELP`, kept on a single line so every
/// command still gets exactly one reply line.
pub const HELP_SUMMARY: &str = "CREATE_PLAYER | USE_PLAYER <playerId> | CREATE_GAME \
| JOIN_GAME <gameId> | LIST_GAMES | PLACE_SHIP <row,col>... \
| SHOOT <gameId> <row> <col> | HELP | QUIT";

/// Converts lines into commands and replies into lines.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Parses one client line (without terminator) into a command.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] describing the first problem found.
    fn decode(&self, line: &str) -> Result<Command, ProtocolError>;

    /// Renders a reply as one line (without terminator).
    fn encode(&self, reply: &Reply) -> String;
}

// ---------------------------------------------------------------------------
// TextCodec
// ---------------------------------------------------------------------------

/// The whitespace-separated text protocol.
///
/// Command tokens are case-insensitive, arguments are separated by any
/// run of whitespace, and arguments past the ones a command uses are
/// ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextCodec;

impl Codec for TextCodec {
    fn decode(&self, line: &str) -> Result<Command, ProtocolError> {
        let mut tokens = line.split_whitespace();
        let command = tokens
            .next()
            .ok_or(ProtocolError::Empty)?
            .to_ascii_uppercase();
        let args: Vec<&str> = tokens.collect();

        match command.as_str() {
            "CREATE_PLAYER" => Ok(Command::CreatePlayer),
            "USE_PLAYER" => {
                let [id, ..] = &args[..] else {
                    return Err(ProtocolError::MissingArguments {
                        usage: "USE_PLAYER <playerId>",
                    });
                };
                Ok(Command::UsePlayer(PlayerId(parse_number(id, "playerId")?)))
            }
            "CREATE_GAME" => Ok(Command::CreateGame),
            "JOIN_GAME" => {
                let [id, ..] = &args[..] else {
                    return Err(ProtocolError::MissingArguments {
                        usage: "JOIN_GAME <gameId>",
                    });
                };
                Ok(Command::JoinGame(MatchId(parse_number(id, "gameId")?)))
            }
            "LIST_GAMES" => Ok(Command::ListGames),
            "PLACE_SHIP" => {
                if args.is_empty() {
                    return Err(ProtocolError::MissingArguments {
                        usage: "PLACE_SHIP <row,col>...",
                    });
                }
                let cells = args
                    .iter()
                    .map(|token| token.parse::<Coordinate>())
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Command::PlaceShip(cells))
            }
            "SHOOT" => {
                let [id, row, col, ..] = &args[..] else {
                    return Err(ProtocolError::MissingArguments {
                        usage: "SHOOT <gameId> <row> <col>",
                    });
                };
                Ok(Command::Shoot {
                    match_id: MatchId(parse_number(id, "gameId")?),
                    target: Coordinate::new(
                        parse_number(row, "row")?,
                        parse_number(col, "column")?,
                    ),
                })
            }
            "HELP" => Ok(Command::Help),
            "QUIT" => Ok(Command::Quit),
            _ => Err(ProtocolError::UnknownCommand(command)),
        }
    }

    fn encode(&self, reply: &Reply) -> String {
        match reply {
            Reply::Player(id) => format!("PLAYER {}", id.0),
            Reply::Game(id) => format!("GAME {}", id.0),
            Reply::Joined(id) => format!("JOINED {}", id.0),
            Reply::Games(entries) if entries.is_empty() => "GAMES".to_string(),
            Reply::Games(entries) => format!("GAMES {}", entries.join(" | ")),
            Reply::Ship { ship_id, size } => {
                format!("SHIP {} SIZE {}", ship_id.0, size)
            }
            Reply::Result(outcome) => format!("RESULT {}", outcome.wire_name()),
            Reply::Help => format!("HELP {HELP_SUMMARY}"),
            Reply::Bye => "BYE".to_string(),
            Reply::Error(message) => format!("ERROR {}", single_line(message)),
            Reply::Notify(text) => format!("NOTIFY {}", single_line(text)),
        }
    }
}

/// Free text must never smuggle a line break onto the wire: one reply
/// is one line.
fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}
