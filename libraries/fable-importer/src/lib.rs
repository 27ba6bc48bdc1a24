//! FableFlow Importer
//!
//! Moves ebooks from a drop directory into the managed library and keeps the
//! catalog in step with what is on disk.
//!
//! # Features
//!
//! - Background import sessions with live progress snapshots
//! - Deterministic library layout (`<Author>/<Title>/<Title> - <Author>.epub`)
//! - Quarantine of unreadable or incomplete files, with recorded reasons
//! - Dry runs that report without touching the filesystem
//! - Rotated JSON session logs
//! - Catalog reconciliation (scan and rescan)
//!
//! # Architecture
//!
//! - `scanner`: Filesystem scanning for candidate files
//! - `copy`: Target paths and copying into the library
//! - `session`: Import session orchestration
//! - `session_log`: Persisted session records
//! - `quarantine`: Listing quarantined files with their reasons
//! - `reconciler`: Catalog scan/rescan against a directory tree

mod error;
mod types;

// Core modules
pub mod copy;
pub mod quarantine;
pub mod reconciler;
pub mod scanner;
pub mod session;
pub mod session_log;

pub use error::ImportError;
pub use reconciler::LibraryReconciler;
pub use scanner::FileScanner;
pub use session::{CompletionHook, ImportService};
pub use session_log::SessionLogStore;
pub use types::*;

/// Re-export commonly used types
pub type Result<T> = std::result::Result<T, ImportError>;
