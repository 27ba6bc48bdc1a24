//! Catalog book records

use serde::{Deserialize, Serialize};

/// Catalog row ID
pub type BookId = i64;

/// A book known to the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Unique ID
    pub id: BookId,

    pub title: String,
    pub author: String,

    /// Absolute path of the backing file (unique within the catalog)
    pub file_path: String,

    /// File size in bytes
    pub file_size: i64,

    /// Lowercase extension without the dot (e.g. "epub")
    pub format: String,

    pub isbn: Option<String>,
    pub publisher: Option<String>,

    /// Created timestamp (Unix epoch seconds)
    pub added_at: i64,

    /// Last updated timestamp (Unix epoch seconds)
    pub updated_at: i64,
}

/// Request to add a book to the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub file_path: String,
    pub file_size: i64,
    pub format: String,
    pub isbn: Option<String>,
    pub publisher: Option<String>,
}
