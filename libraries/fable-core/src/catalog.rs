//! Catalog trait for persisted book records

use crate::error::Result;
use crate::types::{Book, BookId, NewBook};
use async_trait::async_trait;

/// Persistent index of books known to the library.
///
/// The reconciler only needs path-keyed lookups, inserts, deletes, and a full
/// listing, so that is the whole surface. Implementations must treat
/// `file_path` as unique.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Insert a new book row
    async fn insert_book(&self, book: NewBook) -> Result<Book>;

    /// Delete a book row by ID
    async fn delete_book(&self, id: BookId) -> Result<()>;

    /// Find the row for an exact file path
    async fn find_by_path(&self, file_path: &str) -> Result<Option<Book>>;

    /// Check whether a row exists for an exact file path
    async fn book_exists(&self, file_path: &str) -> Result<bool> {
        Ok(self.find_by_path(file_path).await?.is_some())
    }

    /// Get every book in the catalog
    async fn list_all(&self) -> Result<Vec<Book>>;
}
