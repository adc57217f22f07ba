use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] nook_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid ID: {0}")]
    InvalidId(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "Remote API is not configured. Run `nook config init --api-url <URL> --owner <NAME>`, or set NOOK_API_URL."
    )]
    ApiNotConfigured,
    #[error("No owner configured. Run `nook config init --owner <NAME>`, or set NOOK_OWNER.")]
    OwnerNotConfigured,
}
