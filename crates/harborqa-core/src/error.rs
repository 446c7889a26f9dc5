//! Error types for the core storage and configuration layer.

use thiserror::Error;

/// Errors raised by the chunk index and fallback catalog loading.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("index error: {0}")]
    Index(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
}
