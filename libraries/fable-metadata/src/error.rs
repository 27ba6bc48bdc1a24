/// Metadata-specific errors
use thiserror::Error;

/// Result type alias using `MetadataError`
pub type Result<T> = std::result::Result<T, MetadataError>;

/// Metadata error types
#[derive(Error, Debug)]
pub enum MetadataError {
    /// File could not be opened or is not a zip archive
    #[error("Failed to open package {path}: {reason}")]
    PackageOpen { path: String, reason: String },

    /// No OPF root document could be located
    #[error("No root document found in {0}")]
    RootDocumentNotFound(String),

    /// Named entry is not present in the archive
    #[error("Entry not found: {0}")]
    EntryNotFound(String),

    /// OPF or container XML could not be parsed
    #[error("OPF parsing error: {0}")]
    OpfParse(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Zip error while reading an entry
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
}

impl From<quick_xml::Error> for MetadataError {
    fn from(err: quick_xml::Error) -> Self {
        Self::OpfParse(err.to_string())
    }
}

impl From<MetadataError> for fable_core::FableError {
    fn from(err: MetadataError) -> Self {
        fable_core::FableError::metadata(err.to_string())
    }
}
