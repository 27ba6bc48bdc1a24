use fable_metadata::MetadataError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during cover extraction
#[derive(Debug, Error)]
pub enum ArtworkError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Only EPUB packages carry covers
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Package could not be opened or read
    #[error("Package error: {0}")]
    Package(#[from] MetadataError),

    /// No cover found in the package
    #[error("No cover found")]
    NotFound,

    /// Cover bytes could not be decoded or the thumbnail encoded
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Thumbnail box has a zero dimension
    #[error("Invalid thumbnail size: {0}x{1}")]
    InvalidDimensions(u32, u32),

    /// Cover too large
    #[error("Cover too large: {0} bytes (max {1} bytes)")]
    TooLarge(usize, usize),
}

/// Result type for artwork operations
pub type Result<T> = std::result::Result<T, ArtworkError>;
