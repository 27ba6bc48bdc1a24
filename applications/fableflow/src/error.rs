/// Application error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] fable_core::FableError),

    #[error("Import error: {0}")]
    Import(#[from] fable_importer::ImportError),

    #[error("Cover error: {0}")]
    Artwork(#[from] fable_artwork::ArtworkError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage setup failed: {0}")]
    Storage(String),

    #[error("Import session {0} ended without a record")]
    SessionLost(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Storage(err.to_string())
    }
}
