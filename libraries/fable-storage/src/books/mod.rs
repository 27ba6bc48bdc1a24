//! Book catalog storage
//!
//! Rows are keyed by their absolute file path; the reconciler is the only
//! writer.
//!
//! # Example
//!
//! ```rust,no_run
//! use fable_core::NewBook;
//! use fable_storage::books;
//!
//! # async fn example(pool: &sqlx::SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
//! let book = books::insert(pool, NewBook {
//!     title: "Dune".into(),
//!     author: "Frank Herbert".into(),
//!     file_path: "/library/Frank Herbert/Dune/Dune - Frank Herbert.epub".into(),
//!     file_size: 1_204_311,
//!     format: "epub".into(),
//!     isbn: None,
//!     publisher: None,
//! })
//! .await?;
//!
//! assert!(books::find_by_path(pool, &book.file_path).await?.is_some());
//! books::delete(pool, book.id).await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, StorageError};
use fable_core::{Book, BookId, NewBook};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

const BOOK_COLUMNS: &str =
    "id, title, author, file_path, file_size, format, isbn, publisher, added_at, updated_at";

fn row_to_book(row: &SqliteRow) -> Result<Book> {
    Ok(Book {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        file_path: row.try_get("file_path")?,
        file_size: row.try_get("file_size")?,
        format: row.try_get("format")?,
        isbn: row.try_get("isbn")?,
        publisher: row.try_get("publisher")?,
        added_at: row.try_get("added_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Insert a new book
pub async fn insert(pool: &SqlitePool, book: NewBook) -> Result<Book> {
    let now = chrono::Utc::now().timestamp();

    let result = sqlx::query(
        r#"
        INSERT INTO books (title, author, file_path, file_size, format, isbn, publisher, added_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&book.title)
    .bind(&book.author)
    .bind(&book.file_path)
    .bind(book.file_size)
    .bind(&book.format)
    .bind(&book.isbn)
    .bind(&book.publisher)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(Book {
        id: result.last_insert_rowid(),
        title: book.title,
        author: book.author,
        file_path: book.file_path,
        file_size: book.file_size,
        format: book.format,
        isbn: book.isbn,
        publisher: book.publisher,
        added_at: now,
        updated_at: now,
    })
}

/// Delete a book by ID
pub async fn delete(pool: &SqlitePool, id: BookId) -> Result<()> {
    let result = sqlx::query("DELETE FROM books WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(StorageError::not_found("Book", id.to_string()));
    }

    Ok(())
}

/// Get a book by ID
pub async fn get_by_id(pool: &SqlitePool, id: BookId) -> Result<Option<Book>> {
    let row = sqlx::query(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_book).transpose()
}

/// Find the book stored at an exact file path
pub async fn find_by_path(pool: &SqlitePool, file_path: &str) -> Result<Option<Book>> {
    let row = sqlx::query(&format!("SELECT {BOOK_COLUMNS} FROM books WHERE file_path = ?"))
        .bind(file_path)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(row_to_book).transpose()
}

/// Get all books ordered by title
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Book>> {
    let rows = sqlx::query(&format!(
        "SELECT {BOOK_COLUMNS} FROM books ORDER BY title COLLATE NOCASE, id"
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_book).collect()
}

/// Case-insensitive substring search over title and author
pub async fn search(pool: &SqlitePool, query: &str) -> Result<Vec<Book>> {
    let pattern = format!("%{}%", query.trim());

    let rows = sqlx::query(&format!(
        "SELECT {BOOK_COLUMNS} FROM books
         WHERE title LIKE ? OR author LIKE ?
         ORDER BY title COLLATE NOCASE, id"
    ))
    .bind(&pattern)
    .bind(&pattern)
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_book).collect()
}

/// Number of books in the catalog
pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS total FROM books")
        .fetch_one(pool)
        .await?;

    Ok(row.try_get("total")?)
}
