/// Application configuration
use crate::error::{AppError, Result};
use fable_importer::ImportConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file read when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default = "default_library")]
    pub library: LibrarySettings,

    #[serde(default = "default_logs")]
    pub logs: LogSettings,

    #[serde(default = "default_database")]
    pub database: DatabaseSettings,

    #[serde(default = "default_covers")]
    pub covers: CoverSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LibrarySettings {
    /// Root of the managed library
    #[serde(default = "default_scan_directory")]
    pub scan_directory: PathBuf,

    /// Drop directory for new books
    #[serde(default = "default_import_directory")]
    pub import_directory: PathBuf,

    #[serde(default = "default_quarantine_directory")]
    pub quarantine_directory: PathBuf,

    /// Extensions reconciled into the catalog
    #[serde(default = "default_extensions")]
    pub supported_extensions: Vec<String>,

    /// Extensions picked up from the import directory
    #[serde(default = "default_extensions")]
    pub import_extensions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LogSettings {
    #[serde(default = "default_log_directory")]
    pub directory: PathBuf,

    /// Session logs kept after rotation (0 keeps everything)
    #[serde(default = "default_max_import_logs")]
    pub max_import_logs: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_database_url")]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CoverSettings {
    #[serde(default = "default_thumbnail_width")]
    pub thumbnail_width: u32,

    #[serde(default = "default_thumbnail_height")]
    pub thumbnail_height: u32,

    /// Covers held in memory
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,
}

impl AppConfig {
    /// Load configuration from file and environment.
    ///
    /// An explicit `path` must exist; otherwise `config.toml` is read when
    /// present. Variables such as `FABLE_LIBRARY__SCAN_DIRECTORY` override
    /// file values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (prefixed with FABLE_)
        settings = settings.add_source(
            config::Environment::with_prefix("FABLE")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("library.supported_extensions")
                .with_list_parse_key("library.import_extensions")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.library.supported_extensions.is_empty() {
            return Err(AppError::Config(
                "library.supported_extensions must not be empty".to_string(),
            ));
        }

        if self.library.import_extensions.is_empty() {
            return Err(AppError::Config(
                "library.import_extensions must not be empty".to_string(),
            ));
        }

        if self.covers.thumbnail_width == 0 || self.covers.thumbnail_height == 0 {
            return Err(AppError::Config(format!(
                "thumbnail box must be non-zero, got {}x{}",
                self.covers.thumbnail_width, self.covers.thumbnail_height
            )));
        }

        if self.library.quarantine_directory == self.library.import_directory {
            return Err(AppError::Config(format!(
                "quarantine directory {:?} must differ from the import directory",
                self.library.quarantine_directory
            )));
        }

        Ok(())
    }

    /// Directory settings for the import service
    pub fn import_config(&self) -> ImportConfig {
        ImportConfig {
            import_dir: self.library.import_directory.clone(),
            scan_dir: self.library.scan_directory.clone(),
            quarantine_dir: self.library.quarantine_directory.clone(),
            log_dir: self.logs.directory.clone(),
            max_logs: self.logs.max_import_logs,
            import_extensions: self.library.import_extensions.clone(),
        }
    }
}

// Default values
fn default_library() -> LibrarySettings {
    LibrarySettings {
        scan_directory: default_scan_directory(),
        import_directory: default_import_directory(),
        quarantine_directory: default_quarantine_directory(),
        supported_extensions: default_extensions(),
        import_extensions: default_extensions(),
    }
}

fn default_scan_directory() -> PathBuf {
    PathBuf::from("./data/books")
}

fn default_import_directory() -> PathBuf {
    PathBuf::from("./data/import")
}

fn default_quarantine_directory() -> PathBuf {
    PathBuf::from("./data/quarantine")
}

fn default_extensions() -> Vec<String> {
    vec!["epub".to_string()]
}

fn default_logs() -> LogSettings {
    LogSettings {
        directory: default_log_directory(),
        max_import_logs: default_max_import_logs(),
    }
}

fn default_log_directory() -> PathBuf {
    PathBuf::from("./data/logs")
}

fn default_max_import_logs() -> usize {
    10
}

fn default_database() -> DatabaseSettings {
    DatabaseSettings {
        url: default_database_url(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/fableflow.db".to_string()
}

fn default_covers() -> CoverSettings {
    CoverSettings {
        thumbnail_width: default_thumbnail_width(),
        thumbnail_height: default_thumbnail_height(),
        cache_size: default_cache_size(),
    }
}

fn default_thumbnail_width() -> u32 {
    fable_artwork::THUMBNAIL_WIDTH
}

fn default_thumbnail_height() -> u32 {
    fable_artwork::THUMBNAIL_HEIGHT
}

fn default_cache_size() -> usize {
    64
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            library: default_library(),
            logs: default_logs(),
            database: default_database(),
            covers: default_covers(),
        }
    }
}
