use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdminError>;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Failed to serialize output: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::error::StorageError),

    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0} user(s) have totals that do not match their scans")]
    Inconsistent(usize),
}
