use shortlink_core::StorageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RedirectorError>;

#[derive(Debug, Clone, Error)]
pub enum RedirectorError {
    #[error("short code not found: {0}")]
    NotFound(String),
    #[error("storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for RedirectorError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::NotFound(code) => Self::NotFound(code),
            other => Self::Storage(other),
        }
    }
}
