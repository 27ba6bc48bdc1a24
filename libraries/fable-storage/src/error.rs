/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Row violated a uniqueness constraint
    #[error("Duplicate entry: {0}")]
    Duplicate(String),

    /// Stored value could not be mapped to a domain type
    #[error("Invalid row: {0}")]
    InvalidRow(String),

    /// Migration error
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Database error from `SQLx`
    #[error(transparent)]
    Database(sqlx::Error),
}

impl StorageError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Duplicate(db.message().to_string())
            }
            other => Self::Database(other),
        }
    }
}

impl From<StorageError> for fable_core::FableError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity, id } => fable_core::FableError::not_found(entity, id),
            StorageError::Duplicate(msg) => fable_core::FableError::Duplicate(msg),
            other => fable_core::FableError::storage(other.to_string()),
        }
    }
}
