use portal_config::ConfigError;
use portal_core::CoreError;
use thiserror::Error;

/// Error type surfaced by the CLI.
#[derive(Debug, Error)]
pub enum PortalError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("List `{0}` could not be loaded")]
    ListUnavailable(String),
}
