//! Library reconciliation
//!
//! Brings the catalog in line with the files actually present under a library
//! root. `scan` only adds rows; `rescan` also deletes rows whose file was not
//! seen during the walk.

use crate::scanner::FileScanner;
use crate::{ImportError, Result, RescanOutcome};
use fable_core::{BookMetadata, Catalog, NewBook};
use fable_metadata::MetadataExtractor;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Keeps the catalog in sync with a directory tree
#[derive(Clone)]
pub struct LibraryReconciler {
    catalog: Arc<dyn Catalog>,
    extractor: MetadataExtractor,
    scanner: FileScanner,
}

impl LibraryReconciler {
    /// Reconcile files with any of `extensions` (case-insensitive)
    pub fn new<I, S>(catalog: Arc<dyn Catalog>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            catalog,
            extractor: MetadataExtractor::new(),
            scanner: FileScanner::new(extensions),
        }
    }

    /// Add a catalog row for every supported file under `root` that has none.
    ///
    /// Returns the number of rows added.
    pub async fn scan(&self, root: &Path) -> Result<usize> {
        let (added, _) = self.walk(root).await?;
        Ok(added)
    }

    /// Run `scan` on a background task
    pub fn spawn_scan(&self, root: PathBuf) -> JoinHandle<Result<usize>> {
        let reconciler = self.clone();
        tokio::spawn(async move {
            let result = reconciler.scan(&root).await;
            match &result {
                Ok(added) => info!("Background scan of {:?} added {} books", root, added),
                Err(e) => warn!("Background scan of {:?} failed: {}", root, e),
            }
            result
        })
    }

    /// Scan `root`, then delete every catalog row whose file was not seen.
    ///
    /// The catalog snapshot is taken before the walk; rows inserted
    /// concurrently by other writers are not considered for deletion.
    pub async fn rescan(&self, root: &Path) -> Result<RescanOutcome> {
        let root = canonical_root(root)?;
        let known = self.catalog.list_all().await?;

        let (added, observed) = self.walk(&root).await?;

        let mut removed = 0;
        for book in known {
            if observed.contains(&book.file_path) {
                continue;
            }
            match self.catalog.delete_book(book.id).await {
                Ok(()) => {
                    info!("Removed missing book {:?} ({})", book.title, book.file_path);
                    removed += 1;
                }
                Err(e) => warn!("Failed to remove book {}: {}", book.file_path, e),
            }
        }

        info!(
            "Rescan of {:?} complete: {} added, {} removed",
            root, added, removed
        );
        Ok(RescanOutcome { added, removed })
    }

    /// Walk `root`, inserting rows for unseen files. Returns the number added
    /// and every path observed (as stored in the catalog).
    async fn walk(&self, root: &Path) -> Result<(usize, HashSet<String>)> {
        let root = canonical_root(root)?;

        let scanner = self.scanner.clone();
        let scan_root = root.clone();
        let files =
            tokio::task::spawn_blocking(move || scanner.scan_directory(&scan_root)).await??;

        debug!("Found {} library files under {:?}", files.len(), root);

        let mut added = 0;
        let mut observed = HashSet::with_capacity(files.len());
        for path in files {
            let key = path.display().to_string();
            observed.insert(key.clone());

            match self.catalog.book_exists(&key).await {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => {
                    warn!("Failed to look up {}: {}", key, e);
                    continue;
                }
            }

            let book = match self.new_book(path).await {
                Ok(book) => book,
                Err(e) => {
                    warn!("Failed to read {}: {}", key, e);
                    continue;
                }
            };

            match self.catalog.insert_book(book).await {
                Ok(book) => {
                    debug!("Added {:?} by {:?}", book.title, book.author);
                    added += 1;
                }
                Err(e) => warn!("Failed to add {}: {}", key, e),
            }
        }

        Ok((added, observed))
    }

    async fn new_book(&self, path: PathBuf) -> Result<NewBook> {
        let extractor = self.extractor;
        tokio::task::spawn_blocking(move || {
            let size = std::fs::metadata(&path)?.len();
            let metadata = extractor.extract(&path).unwrap_or_else(|e| {
                debug!("Falling back to filename for {:?}: {}", path, e);
                MetadataExtractor::from_filename(&path)
            });
            Ok::<_, ImportError>(book_row(&path, size, metadata))
        })
        .await?
    }
}

fn canonical_root(root: &Path) -> Result<PathBuf> {
    if !root.is_dir() {
        return Err(ImportError::InvalidPath(format!(
            "{} is not a directory",
            root.display()
        )));
    }
    Ok(root.canonicalize()?)
}

fn book_row(path: &Path, size: u64, metadata: BookMetadata) -> NewBook {
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    NewBook {
        title: metadata.title,
        author: metadata.author,
        file_path: path.display().to_string(),
        file_size: i64::try_from(size).unwrap_or(i64::MAX),
        format,
        isbn: metadata.isbn,
        publisher: metadata.publisher,
    }
}
