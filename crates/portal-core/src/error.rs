use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Remote call failed: {0}")]
    Remote(String),
    #[error("Record not found: {0}")]
    RecordNotFound(String),
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Operation cancelled: component torn down")]
    Cancelled,
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CoreError::Cancelled)
    }
}
