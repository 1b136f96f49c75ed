//! Error types. None of these ever end a session: the leaderboard and the
//! config loader recover from them after logging.

use std::path::PathBuf;

use thiserror::Error;

/// Leaderboard storage failures.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("leaderboard I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed leaderboard file {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not encode leaderboard: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
