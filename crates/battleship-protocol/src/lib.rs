//! Wire protocol for the battleship server.
//!
//! This crate defines the "language" clients and the server speak:
//!
//! - **Types** ([`Command`], [`Reply`], [`Coordinate`], the id newtypes)
//!   — what travels on the wire.
//! - **Codec** ([`Codec`] trait, [`TextCodec`]) — how those values
//!   become newline-free text lines and back.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while parsing.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw lines) and the
//! session/engine layers. It knows nothing about connections or matches.
//!
//! ```text
//! Transport (lines) → Protocol (Command / Reply) → Engine (game rules)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, HELP_SUMMARY, TextCodec, WELCOME_BANNER};
pub use error::ProtocolError;
pub use types::{
    Command, Coordinate, MatchId, PlayerId, Reply, ShipId, ShotOutcome,
};
