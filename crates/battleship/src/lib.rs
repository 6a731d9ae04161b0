//! # Battleship
//!
//! A two-player battleship server speaking a line-oriented text protocol
//! over TCP.
//!
//! Clients create or reuse a player, open or join a match, place their
//! ships and take turns firing. The server answers every command with
//! exactly one line and pushes `NOTIFY` lines for things that happen to
//! the player in between (an opponent joined, a shot landed, it is their
//! turn).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use battleship::prelude::*;
//!
//! # async fn example() -> Result<(), BattleshipError> {
//! let handle = BattleshipServer::builder()
//!     .bind("127.0.0.1:9090")
//!     .build()
//!     .await?
//!     .start()?;
//! // ... later
//! handle.stop().await;
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod handler;
mod notifier;
mod server;

pub use config::{DEFAULT_PORT, ServerConfig};
pub use error::BattleshipError;
pub use notifier::SessionNotifier;
pub use server::{BattleshipServer, BattleshipServerBuilder, ServerHandle};

pub mod prelude {
    pub use crate::{
        BattleshipError, BattleshipServer, BattleshipServerBuilder,
        ServerConfig, ServerHandle,
    };
    pub use battleship_engine::{
        EngineConfig, EngineError, GameService, MatchState, StartingTurn,
        TurnRule,
    };
    pub use battleship_protocol::{
        Coordinate, MatchId, PlayerId, ShipId, ShotOutcome,
    };
}
