//! Read-only access to the entries of an EPUB zip archive

use crate::error::{MetadataError, Result};
use crate::opf;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Conventional root document names, tried by suffix in this order
const CONVENTIONAL_ROOT_NAMES: &[&str] = &["content.opf", "package.opf", "book.opf", "metadata.opf"];

type RootStrategy = fn(&mut EbookPackage) -> Option<String>;

/// Root document lookups, first hit wins
const ROOT_STRATEGIES: &[(&str, RootStrategy)] = &[
    ("container", EbookPackage::root_from_container),
    ("conventional name", EbookPackage::root_from_conventional_names),
    ("any opf", EbookPackage::root_from_any_opf),
];

/// An opened EPUB package.
///
/// Owned by whoever is processing one file and dropped when that work ends.
pub struct EbookPackage {
    path: PathBuf,
    archive: ZipArchive<File>,
    entries: Vec<String>,
}

impl EbookPackage {
    /// Open a file as a zip archive
    pub fn open(path: &Path) -> Result<Self> {
        let open_error = |reason: String| MetadataError::PackageOpen {
            path: path.display().to_string(),
            reason,
        };

        let file = File::open(path).map_err(|e| open_error(e.to_string()))?;
        let archive = ZipArchive::new(file).map_err(|e| open_error(e.to_string()))?;
        let entries = archive.file_names().map(String::from).collect();

        Ok(Self {
            path: path.to_path_buf(),
            archive,
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entry names in archive order
    pub fn entry_names(&self) -> &[String] {
        &self.entries
    }

    /// Exact entry name, falling back to the first entry ending with `name`
    pub fn resolve_entry(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.as_str() == name)
            .or_else(|| self.entries.iter().find(|entry| entry.ends_with(name)))
            .map(String::as_str)
    }

    /// Read an entry's bytes (exact name first, then suffix match)
    pub fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        let resolved = self
            .resolve_entry(name)
            .ok_or_else(|| MetadataError::EntryNotFound(name.to_string()))?
            .to_string();

        let mut entry = self.archive.by_name(&resolved)?;
        let mut data = Vec::with_capacity(usize::try_from(entry.size()).unwrap_or(0));
        entry.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Read an entry as UTF-8 text, replacing invalid sequences
    pub fn read_entry_string(&mut self, name: &str) -> Result<String> {
        let data = self.read_entry(name)?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    /// Locate the OPF root document
    pub fn find_root_document(&mut self) -> Result<String> {
        for (label, strategy) in ROOT_STRATEGIES {
            if let Some(name) = strategy(self) {
                debug!("Root document {} found via {} in {:?}", name, label, self.path);
                return Ok(name);
            }
        }

        Err(MetadataError::RootDocumentNotFound(
            self.path.display().to_string(),
        ))
    }

    fn root_from_container(&mut self) -> Option<String> {
        let xml = self.read_entry_string(CONTAINER_PATH).ok()?;
        let full_path = opf::parse_container(&xml)?;
        self.resolve_entry(&full_path).map(String::from)
    }

    fn root_from_conventional_names(&mut self) -> Option<String> {
        CONVENTIONAL_ROOT_NAMES.iter().find_map(|name| {
            self.entries
                .iter()
                .find(|entry| entry.ends_with(name))
                .cloned()
        })
    }

    fn root_from_any_opf(&mut self) -> Option<String> {
        self.entries
            .iter()
            .find(|entry| entry.to_ascii_lowercase().ends_with(".opf"))
            .cloned()
    }
}

/// Resolve a manifest href against the directory of the document that
/// declared it. Fragments are dropped and `.`/`..` segments normalized.
pub fn resolve_href(base_document: &str, href: &str) -> String {
    let href = href.split('#').next().unwrap_or_default();
    let base_dir = base_document.rsplit_once('/').map_or("", |(dir, _)| dir);

    let joined = if let Some(absolute) = href.strip_prefix('/') {
        absolute.to_string()
    } else if base_dir.is_empty() {
        href.to_string()
    } else {
        format!("{base_dir}/{href}")
    };

    let mut segments: Vec<&str> = Vec::new();
    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
