//! Server configuration.

use std::path::Path;
use std::time::Duration;

use battleship_engine::EngineConfig;
use battleship_session::SessionConfig;
use serde::{Deserialize, Serialize};

use crate::BattleshipError;

/// Default TCP port.
pub const DEFAULT_PORT: u16 = 9090;

/// Everything the server needs to run, loadable from JSON.
///
/// Missing fields take their defaults, so `{}` is a valid file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on, `host:port`.
    pub bind_addr: String,

    /// How long a single outbound line may take to write before the
    /// connection is dropped.
    pub write_timeout_ms: u64,

    /// Outbound lines that may wait per connection.
    pub outbound_capacity: usize,

    /// How long `stop()` waits for connection tasks before aborting them.
    pub shutdown_grace_ms: u64,

    /// Game rules.
    pub engine: EngineConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{DEFAULT_PORT}"),
            write_timeout_ms: 2000,
            outbound_capacity: 64,
            shutdown_grace_ms: 1000,
            engine: EngineConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Parses a JSON document.
    pub fn from_json(json: &str) -> Result<Self, BattleshipError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BattleshipError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            outbound_capacity: self.outbound_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battleship_engine::{StartingTurn, TurnRule};

    #[test]
    fn test_default_values() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:9090");
        assert_eq!(config.write_timeout(), Duration::from_secs(2));
        assert_eq!(config.outbound_capacity, 64);
        assert_eq!(config.shutdown_grace(), Duration::from_secs(1));
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_from_json_empty_object_is_default() {
        assert_eq!(ServerConfig::from_json("{}").unwrap(), ServerConfig::default());
    }

    #[test]
    fn test_from_json_nested_engine_rules() {
        let config = ServerConfig::from_json(
            r#"{
                "bind_addr": "127.0.0.1:7000",
                "engine": { "starting_turn": "random", "turn_rule": "keep_turn_on_hit" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:7000");
        assert_eq!(config.engine.starting_turn, StartingTurn::Random);
        assert_eq!(config.engine.turn_rule, TurnRule::KeepTurnOnHit);
        assert_eq!(config.engine.board_rows, 10);
    }

    #[test]
    fn test_from_json_malformed_is_config_error() {
        let err = ServerConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, BattleshipError::Config(_)));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = ServerConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, BattleshipError::Io(_)));
    }
}
