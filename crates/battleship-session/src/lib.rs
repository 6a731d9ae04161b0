//! Connection session management for the battleship server.
//!
//! This crate handles the lifecycle of client connections:
//!
//! 1. **Session tracking** — knowing which connections are live
//!    ([`SessionManager`])
//! 2. **Player binding** — which player, if any, each connection speaks
//!    for, with at most one live connection per player
//! 3. **Outbound delivery** — a bounded, ordered queue per connection
//!    ([`SessionHandle`]) that replies wait on and notifications skip
//!    when full
//!
//! # How it fits in the stack
//!
//! ```text
//! Server (above)        ← routes engine notifications to connections
//!     ↕
//! Session Layer (this crate)
//!     ↕
//! Transport / Protocol (below) ← ConnectionId, PlayerId
//! ```

mod error;
mod manager;
mod session;

pub use error::SessionError;
pub use manager::SessionManager;
pub use session::{Session, SessionConfig, SessionHandle, SessionState};
