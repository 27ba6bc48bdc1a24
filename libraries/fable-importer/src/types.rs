//! Common types for the importer

use fable_core::{BookMetadata, QuarantineReason};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Directories and limits for import sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Drop directory scanned for candidates
    pub import_dir: PathBuf,

    /// Root of the managed library (`<scan_dir>/<Author>/<Title>/...`)
    pub scan_dir: PathBuf,

    /// Where rejected files are copied
    pub quarantine_dir: PathBuf,

    /// Session log directory
    pub log_dir: PathBuf,

    /// Session logs kept after rotation (0 keeps everything)
    pub max_logs: usize,

    /// Lowercase extensions (without the dot) picked up from the import directory
    pub import_extensions: Vec<String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            import_dir: PathBuf::from("./data/import"),
            scan_dir: PathBuf::from("./data/books"),
            quarantine_dir: PathBuf::from("./data/quarantine"),
            log_dir: PathBuf::from("./data/logs"),
            max_logs: 10,
            import_extensions: vec!["epub".to_string()],
        }
    }
}

/// Result of reconciling a directory against the catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RescanOutcome {
    /// Rows inserted for newly seen files
    pub added: usize,

    /// Rows deleted because their file is gone
    pub removed: usize,
}

/// A file currently sitting in the quarantine directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarantinedFile {
    pub file_path: String,
    pub file_name: String,
    pub file_size: u64,

    /// Extracted metadata, or filename-derived when extraction fails
    pub metadata: BookMetadata,

    /// Reason recorded by the session that quarantined it, if a log survives
    pub reason: Option<QuarantineReason>,
}
