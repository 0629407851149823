//! Error types shared by the advisor crates.

use thiserror::Error;

/// Errors raised while assembling shared types and settings.
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<config::ConfigError> for AdvisorError {
    fn from(err: config::ConfigError) -> Self {
        AdvisorError::Config(err.to_string())
    }
}
