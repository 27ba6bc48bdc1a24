//! Bibliographic metadata extracted from an ebook file

use serde::{Deserialize, Serialize};

/// Normalized metadata for one ebook.
///
/// `title` and `author` are never empty once produced by the extractor;
/// filename-derived values or `"Unknown"` fill any gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookMetadata {
    pub title: String,
    pub author: String,
    pub publisher: Option<String>,
    pub language: Option<String>,
    pub description: Option<String>,
    pub isbn: Option<String>,
    pub date: Option<String>,
    pub subject: Option<String>,
    pub rights: Option<String>,
}

impl BookMetadata {
    /// Metadata carrying only a title and author
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            ..Self::default()
        }
    }

    /// True when both title and author are present
    pub fn is_complete(&self) -> bool {
        !self.title.trim().is_empty() && !self.author.trim().is_empty()
    }
}
