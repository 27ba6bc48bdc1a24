//! Import session orchestration
//!
//! `ImportService` owns the single current `ImportSession` behind a
//! reader/writer lock. `start_import` claims the slot and hands the batch to a
//! background task; pollers call `status()` and get a cloned snapshot.
//!
//! Each candidate is handled sequentially on one blocking worker:
//! extract metadata, then quarantine, skip, or copy into the library.

use crate::copy;
use crate::scanner::FileScanner;
use crate::session_log::SessionLogStore;
use crate::{ImportConfig, ImportError, Result};
use chrono::Utc;
use fable_core::{ImportSession, QuarantinedBook, SessionSummary};
use fable_metadata::{MetadataError, MetadataExtractor};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::collections::HashSet;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Quarantine reason when the package cannot be read at all
pub const REASON_EXTRACTION_FAILED: &str = "metadata extraction failed";

/// Quarantine reason when title or author is empty
pub const REASON_MISSING_FIELDS: &str = "missing title or author";

/// Callback run once after a non-dry-run session finishes
pub type CompletionHook = Arc<dyn Fn(ImportSession) -> BoxFuture<'static, ()> + Send + Sync>;

/// Runs import sessions, one at a time
#[derive(Clone)]
pub struct ImportService {
    config: Arc<ImportConfig>,
    scanner: FileScanner,
    extractor: MetadataExtractor,
    log_store: SessionLogStore,
    current: Arc<RwLock<Option<ImportSession>>>,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
    on_complete: Option<CompletionHook>,
}

impl ImportService {
    /// Create a service for the given directories
    pub fn new(config: ImportConfig) -> Self {
        let log_store = SessionLogStore::new(config.log_dir.clone(), config.max_logs);
        let scanner = FileScanner::new(&config.import_extensions);

        Self {
            config: Arc::new(config),
            scanner,
            extractor: MetadataExtractor::new(),
            log_store,
            current: Arc::new(RwLock::new(None)),
            worker: Arc::new(Mutex::new(None)),
            on_complete: None,
        }
    }

    /// Run `hook` after every completed non-dry-run session
    pub fn on_complete<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(ImportSession) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_complete = Some(Arc::new(move |session| hook(session).boxed()));
        self
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn log_store(&self) -> &SessionLogStore {
        &self.log_store
    }

    fn read_session(&self) -> RwLockReadGuard<'_, Option<ImportSession>> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_session(&self) -> RwLockWriteGuard<'_, Option<ImportSession>> {
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, mutate: impl FnOnce(&mut ImportSession)) {
        if let Some(session) = self.write_session().as_mut() {
            mutate(session);
        }
    }

    /// Start a new session in the background and return its initial snapshot.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_import(&self, dry_run: bool) -> Result<ImportSession> {
        let snapshot = {
            let mut current = self.write_session();
            if let Some(running) = current.as_ref().filter(|s| s.is_running()) {
                return Err(ImportError::SessionInProgress(running.id.clone()));
            }

            let session = ImportSession::new(dry_run, self.log_store.dir());
            *current = Some(session.clone());
            session
        };

        info!(
            "Starting import session {} (dry run: {}) from {:?}",
            snapshot.id, dry_run, self.config.import_dir
        );

        let service = self.clone();
        let handle = tokio::spawn(async move { service.run(dry_run).await });
        *self.worker.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);

        Ok(snapshot)
    }

    /// Snapshot of the current (or most recent) session
    pub fn status(&self) -> Option<ImportSession> {
        self.read_session().clone()
    }

    pub fn is_running(&self) -> bool {
        self.read_session().as_ref().is_some_and(ImportSession::is_running)
    }

    /// Wait for the background worker, if any, and return the final snapshot
    pub async fn wait(&self) -> Option<ImportSession> {
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("Import worker task failed: {}", e);
            }
        }
        self.status()
    }

    /// Summaries of persisted sessions, newest first
    pub fn list_logs(&self) -> Result<Vec<SessionSummary>> {
        self.log_store.list()
    }

    /// Full record of a persisted session
    pub fn get_log(&self, session_id: &str) -> Result<ImportSession> {
        self.log_store.get(session_id)
    }

    async fn run(self, dry_run: bool) {
        let worker = self.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || worker.process_batch(dry_run)).await {
            error!("Import batch panicked: {}", e);
            self.update(|s| s.fail(format!("import worker failed: {e}")));
        }

        self.finish().await;
    }

    fn process_batch(&self, dry_run: bool) {
        let import_dir = &self.config.import_dir;
        let files = match self.scanner.scan_directory(import_dir) {
            Ok(files) => files,
            Err(e) => {
                error!("Failed to enumerate import directory {:?}: {}", import_dir, e);
                self.update(|s| {
                    s.fail(format!(
                        "failed to read import directory {}: {}",
                        import_dir.display(),
                        e
                    ));
                });
                return;
            }
        };

        info!("Found {} candidate files in {:?}", files.len(), import_dir);
        self.update(|s| s.total_files = files.len() as u64);

        // Targets a dry run would have written, standing in for the copies
        let mut planned = HashSet::new();
        for file in &files {
            self.process_file(file, dry_run, &mut planned);
        }
    }

    fn process_file(&self, path: &Path, dry_run: bool, planned: &mut HashSet<PathBuf>) {
        self.update(|s| s.processed_files += 1);

        let extracted = panic::catch_unwind(AssertUnwindSafe(|| self.extractor.extract(path)))
            .unwrap_or_else(|_| Err(MetadataError::OpfParse("metadata reader panicked".to_string())));

        let metadata = match extracted {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("Failed to extract metadata from {:?}: {}", path, e);
                let detail = e.to_string();
                self.update(|s| {
                    s.errors.push(format!(
                        "failed to extract metadata from {}: {}",
                        path.display(),
                        detail
                    ));
                });
                self.quarantine(path, REASON_EXTRACTION_FAILED, &detail, dry_run);
                return;
            }
        };

        if !metadata.is_complete() {
            warn!("Missing title or author in {:?}", path);
            self.update(|s| {
                s.errors
                    .push(format!("missing title or author in {}", path.display()));
            });
            self.quarantine(path, REASON_MISSING_FIELDS, "", dry_run);
            return;
        }

        let target = copy::target_path(&self.config.scan_dir, &metadata);
        if target.exists() {
            info!("Skipping {:?}: {:?} already exists", path, target);
            self.update(|s| s.skipped_files += 1);
            return;
        }

        if dry_run {
            if !planned.insert(target.clone()) {
                info!("Skipping {:?}: {:?} already planned in this run", path, target);
                self.update(|s| s.skipped_files += 1);
                return;
            }
            info!("Would import {:?} -> {:?}", path, target);
            self.update(|s| s.imported_files += 1);
            return;
        }

        match copy::copy_file(path, &target) {
            Ok(_) => {
                info!("Imported {:?} -> {:?}", path, target);
                self.update(|s| s.imported_files += 1);
            }
            Err(e) => {
                warn!("Failed to copy {:?} to {:?}: {}", path, target, e);
                self.update(|s| {
                    s.errors.push(format!(
                        "failed to copy {} to {}: {}",
                        path.display(),
                        target.display(),
                        e
                    ));
                });
            }
        }
    }

    /// Copy (never move) a rejected file aside and record why.
    ///
    /// Dry runs record the intended destination without copying.
    fn quarantine(&self, path: &Path, reason: &str, error_detail: &str, dry_run: bool) {
        let destination = match copy::quarantine_path(&self.config.quarantine_dir, path) {
            Ok(destination) => destination,
            Err(e) => {
                self.update(|s| {
                    s.errors
                        .push(format!("failed to quarantine {}: {}", path.display(), e));
                });
                return;
            }
        };

        if dry_run {
            info!("Would quarantine {:?} -> {:?} ({})", path, destination, reason);
        } else if let Err(e) = copy::copy_file(path, &destination) {
            warn!("Failed to quarantine {:?}: {}", path, e);
            self.update(|s| {
                s.errors
                    .push(format!("failed to quarantine {}: {}", path.display(), e));
            });
            return;
        } else {
            info!("Quarantined {:?} -> {:?} ({})", path, destination, reason);
        }

        let record = QuarantinedBook {
            file_path: path.display().to_string(),
            quarantine_path: destination.display().to_string(),
            reason: reason.to_string(),
            error_detail: error_detail.to_string(),
            timestamp: Utc::now(),
        };
        self.update(|s| {
            s.quarantined_books.push(record);
            s.quarantined_files += 1;
        });
    }

    async fn finish(&self) {
        let session = {
            let mut current = self.write_session();
            let Some(session) = current.as_mut() else {
                return;
            };
            session.finish();
            session.clone()
        };

        info!(
            "Import session {} {}: {} processed, {} imported, {} quarantined, {} skipped, {} errors",
            session.id,
            session.status,
            session.processed_files,
            session.imported_files,
            session.quarantined_files,
            session.skipped_files,
            session.errors.len()
        );

        if let Err(e) = self.log_store.save(&session) {
            error!("Failed to save session log for {}: {}", session.id, e);
        }

        if !session.dry_run {
            if let Some(hook) = &self.on_complete {
                hook(session).await;
            }
        }
    }
}
