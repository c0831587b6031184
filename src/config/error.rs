//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Config validation error: {field}: {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },
}

impl ConfigError {
    pub(super) fn invalid(field: &'static str, message: &'static str) -> Self {
        Self::Validation { field, message }
    }
}
