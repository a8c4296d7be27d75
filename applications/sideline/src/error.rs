/// Soundboard application errors
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] sideline_core::SidelineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<sideline_storage::StorageError> for AppError {
    fn from(err: sideline_storage::StorageError) -> Self {
        // StorageError -> SidelineError -> AppError
        AppError::Core(err.into())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
