//! Search configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! [`SearchConfig::default`].

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// A value is outside the range the search can work with.
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
}

/// Tunables for [`Searcher`](crate::Searcher).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Requested depth for [`Searcher::find_best_move`](crate::Searcher::find_best_move).
    pub depth: u32,
    /// Depth of the cheaper suggestion search.
    pub suggest_depth: u32,
    /// Number of transposition table slots.
    pub tt_capacity: usize,
    /// Null-move pruning needs strictly more non-king pieces than this.
    pub null_move_min_pieces: usize,
    /// Depth reduction of the null-move search.
    pub null_move_reduction: u32,
    /// Search deeper when few pieces remain.
    pub endgame_extension: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            depth: 4,
            suggest_depth: 2,
            tt_capacity: 1 << 18,
            null_move_min_pieces: 6,
            null_move_reduction: 3,
            endgame_extension: true,
        }
    }
}

impl SearchConfig {
    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: SearchConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tt_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "tt_capacity",
                reason: "must be at least one slot",
            });
        }
        if self.null_move_reduction == 0 {
            return Err(ConfigError::InvalidValue {
                field: "null_move_reduction",
                reason: "must be positive",
            });
        }
        Ok(())
    }
}
