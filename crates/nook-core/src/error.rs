//! Error types for nook-core

use thiserror::Error;

/// Result type alias using nook-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in nook-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Remote store rejected or could not service a request
    #[error("Remote store error: {0}")]
    Remote(String),

    /// HTTP transport error talking to the remote store
    #[error("Remote HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Local persistence layer unavailable
    #[error("Local persistence error: {0}")]
    Persistence(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Category parent relation would stop being a forest
    #[error("Category cycle: {0}")]
    CategoryCycle(String),
}
