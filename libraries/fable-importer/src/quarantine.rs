//! Inspection of the quarantine directory
//!
//! Files in quarantine carry no sidecar data; the reason each one is there is
//! recovered from the session logs that recorded it.

use crate::scanner::FileScanner;
use crate::session_log::SessionLogStore;
use crate::{QuarantinedFile, Result};
use fable_core::QuarantineReason;
use fable_metadata::MetadataExtractor;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Map quarantine paths to the reason recorded for them.
///
/// Logs are read newest first and the first record for a path wins, so a
/// file quarantined again keeps its latest reason. Dry-run sessions never
/// copied anything and are ignored.
pub fn load_quarantine_reasons(logs: &SessionLogStore) -> HashMap<String, QuarantineReason> {
    let sessions = match logs.sessions() {
        Ok(sessions) => sessions,
        Err(e) => {
            warn!("Failed to read session logs from {:?}: {}", logs.dir(), e);
            return HashMap::new();
        }
    };

    let mut reasons = HashMap::new();
    for session in sessions.iter().filter(|s| !s.dry_run) {
        for book in &session.quarantined_books {
            reasons
                .entry(book.quarantine_path.clone())
                .or_insert_with(|| QuarantineReason::from(book));
        }
    }
    reasons
}

/// Every supported file currently in `quarantine_dir`, with metadata and the
/// recorded reason when one survives in the logs.
///
/// A missing quarantine directory is simply empty.
pub fn list_quarantined(
    quarantine_dir: &Path,
    logs: &SessionLogStore,
    extractor: &MetadataExtractor,
    scanner: &FileScanner,
) -> Result<Vec<QuarantinedFile>> {
    if !quarantine_dir.exists() {
        return Ok(Vec::new());
    }

    let reasons = load_quarantine_reasons(logs);
    let mut files = Vec::new();

    for path in scanner.scan_directory(quarantine_dir)? {
        let file_size = match std::fs::metadata(&path) {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                debug!("Skipping unreadable quarantined file {:?}: {}", path, e);
                continue;
            }
        };

        let metadata = extractor
            .extract(&path)
            .unwrap_or_else(|_| MetadataExtractor::from_filename(&path));

        let file_path = path.display().to_string();
        files.push(QuarantinedFile {
            reason: reasons.get(&file_path).cloned(),
            file_name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            file_path,
            file_size,
            metadata,
        });
    }

    Ok(files)
}
