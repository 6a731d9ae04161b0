//! Match engine for the battleship server.
//!
//! The engine is plain synchronous Rust guarded by `parking_lot` locks;
//! it knows nothing about sockets. Connection tasks call into one shared
//! [`GameService`], and the engine talks back through a [`Notifier`].
//!
//! # Key types
//!
//! - [`GameService`] — create/join/place/shoot, turn rules, win detection
//! - [`Board`] — placement validation and shot resolution
//! - [`Repository`] — id-keyed storage with one lock per entity
//! - [`MatchState`] — lifecycle state machine
//! - [`EngineConfig`] — board size, starting turn, turn rule
//! - [`Notifier`] — how the engine reaches players

mod board;
mod config;
mod error;
mod game;
mod notifier;
mod repo;
mod service;
mod ship;

pub use board::{Board, BoardId, Cell, CellState, ShotResult};
pub use config::{EngineConfig, MatchState, StartingTurn, TurnRule};
pub use error::{EngineError, ErrorKind};
pub use game::{Match, MatchInfo, Player};
pub use notifier::{NoopNotifier, Notifier};
pub use repo::{Repository, Shared};
pub use service::GameService;
pub use ship::Ship;
