//! Target paths and file copying for the managed library

use crate::{ImportError, Result};
use fable_core::BookMetadata;
use std::fs;
use std::path::{Path, PathBuf};

/// Deterministic library location: `<scan_dir>/<Author>/<Title>/<Title> - <Author>.epub`
pub fn target_path(scan_dir: &Path, metadata: &BookMetadata) -> PathBuf {
    let author = sanitize_filename_part(&metadata.author);
    let title = sanitize_filename_part(&metadata.title);

    scan_dir
        .join(&author)
        .join(&title)
        .join(format!("{title} - {author}.epub"))
}

/// Quarantine location for a source file: `<quarantine_dir>/<base name>`
pub fn quarantine_path(quarantine_dir: &Path, source_path: &Path) -> Result<PathBuf> {
    let name = source_path
        .file_name()
        .ok_or_else(|| ImportError::InvalidPath(format!("{} has no file name", source_path.display())))?;
    Ok(quarantine_dir.join(name))
}

/// Copy `source` to `dest`, creating parent directories.
///
/// The source is never removed.
pub fn copy_file(source: &Path, dest: &Path) -> Result<u64> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(fs::copy(source, dest)?)
}

/// Sanitize a string for use as a single path component
///
/// Replaces characters that are invalid on common filesystems and never
/// returns an empty, `.` or `..` component.
pub fn sanitize_filename_part(s: &str) -> String {
    let cleaned = s
        .chars()
        .map(|c| match c {
            // Invalid on Windows: < > : " / \ | ? *
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            // Control characters
            c if c.is_control() => '_',
            // Keep everything else
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string();

    if cleaned.is_empty() {
        "_".to_string()
    } else if cleaned.chars().all(|c| c == '.') {
        cleaned.replace('.', "_")
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_target_path_layout() {
        let meta = BookMetadata::new("Wonderland", "Alice");
        assert_eq!(
            target_path(Path::new("/lib"), &meta),
            PathBuf::from("/lib/Alice/Wonderland/Wonderland - Alice.epub")
        );
    }

    #[test]
    fn test_target_path_sanitizes_components() {
        let meta = BookMetadata::new("What? Why: How", "AC/DC");
        assert_eq!(
            target_path(Path::new("/lib"), &meta),
            PathBuf::from("/lib/AC_DC/What_ Why_ How/What_ Why_ How - AC_DC.epub")
        );

        let traversal = BookMetadata::new("..", ".");
        let path = target_path(Path::new("/lib"), &traversal);
        assert!(path.starts_with("/lib"));
        assert_eq!(path, PathBuf::from("/lib/_/__/__ - _.epub"));
    }

    #[test]
    fn test_sanitize_filename_part() {
        assert_eq!(sanitize_filename_part("  Plain Title "), "Plain Title");
        assert_eq!(sanitize_filename_part("tab\there"), "tab_here");
        assert_eq!(sanitize_filename_part("   "), "_");
        assert_eq!(sanitize_filename_part("Mr. Smith"), "Mr. Smith");
    }

    #[test]
    fn test_quarantine_path_uses_base_name() {
        assert_eq!(
            quarantine_path(Path::new("/q"), Path::new("/in/sub/bad.epub")).unwrap(),
            PathBuf::from("/q/bad.epub")
        );
        assert!(quarantine_path(Path::new("/q"), Path::new("/")).is_err());
    }

    #[test]
    fn test_copy_file_creates_parents_and_keeps_source() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("src.epub");
        fs::write(&source, b"contents").unwrap();
        let dest = temp_dir.path().join("a/b/c/dest.epub");

        let bytes = copy_file(&source, &dest).unwrap();

        assert_eq!(bytes, 8);
        assert!(source.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"contents");
    }
}
