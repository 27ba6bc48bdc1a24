//! FableFlow Core
//!
//! Shared domain types, the catalog trait, and error handling for the
//! FableFlow library pipeline.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Book`, `BookMetadata`, `ImportSession`, `QuarantinedBook`
//! - **Catalog Trait**: the persistence seam used by the reconciler
//! - **Error Handling**: Unified `FableError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use fable_core::types::{ImportSession, SessionStatus};
//! use std::path::Path;
//!
//! let session = ImportSession::new(false, Path::new("/var/log/fableflow"));
//! assert_eq!(session.status, SessionStatus::Running);
//! assert!(session.id.starts_with("import_"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod error;
pub mod types;

pub use catalog::Catalog;
pub use error::{FableError, Result};

pub use types::{
    Book, BookId, BookMetadata, ImportSession, NewBook, QuarantineReason, QuarantinedBook,
    SessionStatus, SessionSummary,
};
