//! Error types shared across Classbell crates.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ClassbellError>;

/// Top-level error for all Classbell crates.
#[derive(Debug, Error)]
pub enum ClassbellError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Push error: {0}")]
    Push(String),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
