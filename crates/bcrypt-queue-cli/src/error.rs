//! Error handling for the bcrypt-queue CLI

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Dispatcher error: {0}")]
    Dispatch(#[from] bcrypt_queue_core::DispatchError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Submission rejected: {0}")]
    Rejected(String),

    #[error("Timed out after {waited_secs}s with {received}/{expected} callbacks delivered")]
    Timeout {
        expected: usize,
        received: usize,
        waited_secs: u64,
    },

    #[error("Not a bcrypt hash: {0}")]
    MalformedHash(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
