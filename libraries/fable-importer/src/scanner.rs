//! File scanning for ebook files

use crate::{ImportError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Scanner for ebook files in directories
#[derive(Debug, Clone)]
pub struct FileScanner {
    /// Lowercase extensions without the dot
    extensions: Vec<String>,

    /// Whether to follow symbolic links
    follow_links: bool,

    /// Maximum depth to traverse
    max_depth: Option<usize>,
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new(["epub"])
    }
}

impl FileScanner {
    /// Create a scanner accepting the given extensions (case-insensitive,
    /// with or without a leading dot)
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
            follow_links: false,
            max_depth: None,
        }
    }

    /// Set whether to follow symbolic links
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Set maximum directory depth to traverse
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// True if the path has one of the accepted extensions
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|allowed| *allowed == ext)
            })
            .unwrap_or(false)
    }

    /// Recursively list matching files under `path`, sorted.
    ///
    /// Fails if the root is missing, not a directory, or unreadable.
    /// Unreadable entries below the root are skipped.
    pub fn scan_directory(&self, path: &Path) -> Result<Vec<PathBuf>> {
        if !path.exists() {
            return Err(ImportError::InvalidPath(format!(
                "{} does not exist",
                path.display()
            )));
        }

        if !path.is_dir() {
            return Err(ImportError::InvalidPath(format!(
                "{} is not a directory",
                path.display()
            )));
        }

        // Surface permission errors on the root itself
        fs::read_dir(path)?;

        let mut walker = WalkDir::new(path).follow_links(self.follow_links);
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        let mut files: Vec<PathBuf> = walker
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file() && self.matches(entry.path()))
            .map(|entry| entry.into_path())
            .collect();

        files.sort();
        Ok(files)
    }
}
