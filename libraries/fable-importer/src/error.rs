//! Error types for the importer

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session log error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Catalog error: {0}")]
    Catalog(#[from] fable_core::FableError),

    #[error("Metadata error: {0}")]
    Metadata(#[from] fable_metadata::MetadataError),

    #[error("An import session is already running: {0}")]
    SessionInProgress(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid session id: {0}")]
    InvalidSessionId(String),

    #[error("Session log not found: {0}")]
    LogNotFound(String),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
