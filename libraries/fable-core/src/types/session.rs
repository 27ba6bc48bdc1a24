//! Import session records
//!
//! An `ImportSession` is the full audit record of one batch import. It is
//! serialized verbatim as the session log file, so field names here are the
//! on-disk JSON keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};

/// Millisecond stamp of the most recently issued session id
static LAST_SESSION_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Lifecycle status of an import session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Worker is still processing files
    #[default]
    Running,
    /// Every candidate was processed
    Completed,
    /// Enumeration failed before processing could start
    Failed,
}

impl SessionStatus {
    /// Convert to string for display
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A file that was set aside instead of imported
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarantinedBook {
    /// Original path in the import directory
    pub file_path: String,

    /// Where the copy was (or, for dry runs, would be) placed
    pub quarantine_path: String,

    /// Short classification, e.g. "metadata extraction failed"
    pub reason: String,

    /// Underlying error text, empty when there was none
    pub error_detail: String,

    pub timestamp: DateTime<Utc>,
}

/// Reason attached to a file found in the quarantine directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarantineReason {
    pub reason: String,
    pub error_detail: String,
    pub timestamp: DateTime<Utc>,
}

impl From<&QuarantinedBook> for QuarantineReason {
    fn from(book: &QuarantinedBook) -> Self {
        Self {
            reason: book.reason.clone(),
            error_detail: book.error_detail.clone(),
            timestamp: book.timestamp,
        }
    }
}

/// Progress and audit record for one import batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSession {
    /// Time-derived identifier, `import_<unix millis>`
    pub id: String,

    pub start_time: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,

    pub status: SessionStatus,
    pub dry_run: bool,

    pub total_files: u64,
    pub processed_files: u64,
    pub imported_files: u64,
    pub quarantined_files: u64,
    pub skipped_files: u64,

    /// Append-only error messages
    #[serde(default)]
    pub errors: Vec<String>,

    /// Append-only quarantine records
    #[serde(default)]
    pub quarantined_books: Vec<QuarantinedBook>,

    /// Path of the persisted session log
    pub log_path: String,
}

impl ImportSession {
    /// Start a new running session whose log will live in `log_dir`.
    ///
    /// Ids are unique within the process and never name a log that already
    /// exists in `log_dir`.
    pub fn new(dry_run: bool, log_dir: &Path) -> Self {
        let start_time = Utc::now();
        let mut millis = next_session_millis(start_time.timestamp_millis());
        while log_dir.join(format!("import_{millis}.json")).exists() {
            millis = next_session_millis(millis + 1);
        }
        let id = format!("import_{millis}");
        let log_path = log_dir.join(format!("{id}.json")).display().to_string();

        Self {
            id,
            start_time,
            end_time: None,
            status: SessionStatus::Running,
            dry_run,
            total_files: 0,
            processed_files: 0,
            imported_files: 0,
            quarantined_files: 0,
            skipped_files: 0,
            errors: Vec::new(),
            quarantined_books: Vec::new(),
            log_path,
        }
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    /// Mark the session failed with a fatal error
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = SessionStatus::Failed;
        self.errors.push(error.into());
    }

    /// Stamp the end time; status becomes completed unless already failed
    pub fn finish(&mut self) {
        self.end_time = Some(Utc::now());
        if self.status != SessionStatus::Failed {
            self.status = SessionStatus::Completed;
        }
    }

    /// Listing row for this session given its log file's modification time
    pub fn summary(&self, modified: DateTime<Utc>) -> SessionSummary {
        SessionSummary {
            session_id: self.id.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            status: self.status,
            dry_run: self.dry_run,
            total_files: self.total_files,
            processed_files: self.processed_files,
            imported_files: self.imported_files,
            quarantined_files: self.quarantined_files,
            skipped_files: self.skipped_files,
            modified,
        }
    }
}

/// Summary of a persisted session log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub dry_run: bool,
    pub total_files: u64,
    pub processed_files: u64,
    pub imported_files: u64,
    pub quarantined_files: u64,
    pub skipped_files: u64,

    /// Log file modification time
    pub modified: DateTime<Utc>,
}

/// Claim a stamp no earlier than `at` and later than any issued before
fn next_session_millis(at: i64) -> i64 {
    let mut claimed = at;
    let _ = LAST_SESSION_MILLIS.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
        claimed = at.max(last + 1);
        Some(claimed)
    });
    claimed
}
