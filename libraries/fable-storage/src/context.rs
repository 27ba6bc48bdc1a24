use crate::books;
use async_trait::async_trait;
use fable_core::{error::Result, Book, BookId, Catalog, NewBook};
use sqlx::SqlitePool;

/// Catalog backed by the `books` table
#[derive(Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Catalog for SqliteCatalog {
    async fn insert_book(&self, book: NewBook) -> Result<Book> {
        Ok(books::insert(&self.pool, book).await?)
    }

    async fn delete_book(&self, id: BookId) -> Result<()> {
        Ok(books::delete(&self.pool, id).await?)
    }

    async fn find_by_path(&self, file_path: &str) -> Result<Option<Book>> {
        Ok(books::find_by_path(&self.pool, file_path).await?)
    }

    async fn list_all(&self) -> Result<Vec<Book>> {
        Ok(books::get_all(&self.pool).await?)
    }
}
