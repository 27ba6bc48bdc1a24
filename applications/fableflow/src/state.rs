/// Shared application state
use crate::config::AppConfig;
use crate::error::Result;
use fable_artwork::CoverExtractor;
use fable_core::Catalog;
use fable_importer::{ImportService, LibraryReconciler};
use fable_storage::SqliteCatalog;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Services wired together from one configuration
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub catalog: Arc<dyn Catalog>,
    pub importer: ImportService,
    pub reconciler: LibraryReconciler,
    pub covers: Arc<CoverExtractor>,
}

impl AppState {
    /// Open the catalog and build the services.
    ///
    /// A finished (non-dry-run) import triggers a scan of the library so new
    /// books reach the catalog.
    pub async fn initialize(config: AppConfig) -> Result<Self> {
        ensure_database_dir(&config.database.url)?;
        let pool = fable_storage::create_pool(&config.database.url).await?;
        fable_storage::run_migrations(&pool).await?;
        info!("Catalog opened at {}", config.database.url);

        let catalog: Arc<dyn Catalog> = Arc::new(SqliteCatalog::new(pool));
        Ok(Self::with_catalog(config, catalog))
    }

    pub fn with_catalog(config: AppConfig, catalog: Arc<dyn Catalog>) -> Self {
        let reconciler = LibraryReconciler::new(
            Arc::clone(&catalog),
            &config.library.supported_extensions,
        );

        let hook_reconciler = reconciler.clone();
        let scan_dir = config.library.scan_directory.clone();
        let importer = ImportService::new(config.import_config()).on_complete(move |session| {
            let handle = hook_reconciler.spawn_scan(scan_dir.clone());
            async move {
                info!("Import {} finished, scanning library", session.id);
                if let Err(e) = handle.await {
                    warn!("Library scan after import {} failed: {}", session.id, e);
                }
            }
        });

        let covers = Arc::new(CoverExtractor::new(config.covers.cache_size));

        Self {
            config: Arc::new(config),
            catalog,
            importer,
            reconciler,
            covers,
        }
    }
}

/// Create the parent directory of a file-backed `sqlite://` URL
fn ensure_database_dir(url: &str) -> Result<()> {
    let Some(path) = url.strip_prefix("sqlite://") else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() || path.starts_with(':') {
        return Ok(());
    }

    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn database_dir_is_created_for_file_urls() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("nested/data/catalog.db");

        ensure_database_dir(&format!("sqlite://{}?mode=rwc", db.display())).unwrap();
        assert!(dir.path().join("nested/data").is_dir());

        // In-memory and bare names need nothing
        ensure_database_dir("sqlite::memory:").unwrap();
        ensure_database_dir("sqlite://catalog.db").unwrap();
    }
}
