/// Metadata extraction with filename fallback
use crate::error::{MetadataError, Result};
use crate::opf::{self, first_value, PackageDocument};
use crate::package::EbookPackage;
use fable_core::BookMetadata;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Placeholder used when a title or author cannot be determined
pub const UNKNOWN: &str = "Unknown";

/// Hyphenated ISBN-13 / ISBN-10 shapes accepted as written
static HYPHENATED_ISBN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{3}-\d-\d{3}-\d{5}-\d$|^\d-\d{3}-\d{5}-\d$").expect("valid ISBN pattern")
});

/// Numeric ID suffix some stores append to file names (`Title - Author_1234`)
static ID_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_\d+$").expect("valid suffix pattern"));

/// Extracts bibliographic metadata from ebook files
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataExtractor;

impl MetadataExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract metadata, dispatching on the file extension.
    ///
    /// EPUB package-open and root-document failures are hard errors. A root
    /// document that cannot be read or parsed degrades to filename parsing.
    /// PDF always uses filename parsing.
    pub fn extract(&self, path: &Path) -> Result<BookMetadata> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let metadata = match extension.as_str() {
            "epub" => Self::extract_epub(path)?,
            "pdf" => {
                debug!("PDF metadata not read, using filename for {:?}", path);
                Self::from_filename(path)
            }
            _ => return Err(MetadataError::UnsupportedFormat(path.display().to_string())),
        };

        debug!(
            "Extracted metadata from {:?}: title={:?}, author={:?}",
            path, metadata.title, metadata.author
        );
        Ok(metadata)
    }

    fn extract_epub(path: &Path) -> Result<BookMetadata> {
        let mut package = EbookPackage::open(path)?;
        let root = package.find_root_document()?;

        let document = match package
            .read_entry_string(&root)
            .and_then(|xml| opf::parse_package(&xml))
        {
            Ok(document) => document,
            Err(e) => {
                warn!("Unreadable root document {} in {:?}: {}", root, path, e);
                return Ok(Self::from_filename(path));
            }
        };

        Ok(Self::from_document(&document, path))
    }

    fn from_document(document: &PackageDocument, path: &Path) -> BookMetadata {
        let mut metadata = BookMetadata {
            title: first_value(&document.titles).unwrap_or_default(),
            author: first_value(&document.creators).unwrap_or_default(),
            publisher: first_value(&document.publishers),
            language: first_value(&document.languages),
            description: first_value(&document.descriptions),
            isbn: select_isbn(&document.identifiers),
            date: first_value(&document.dates),
            subject: first_value(&document.subjects),
            rights: first_value(&document.rights),
        };

        if !metadata.is_complete() {
            let fallback = Self::from_filename(path);
            if metadata.title.is_empty() {
                metadata.title = fallback.title;
            }
            if metadata.author.is_empty() {
                metadata.author = fallback.author;
            }
        }

        metadata
    }

    /// Derive title and author from a file name.
    ///
    /// `Title - Author.epub` (optionally with a trailing `_<digits>` ID)
    /// yields both; anything else yields the stem as title and an unknown
    /// author. Never returns empty fields.
    pub fn from_filename(path: &Path) -> BookMetadata {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().trim().to_string())
            .unwrap_or_default();

        if stem.is_empty() {
            return BookMetadata::new(UNKNOWN, UNKNOWN);
        }

        let base = ID_SUFFIX.replace(&stem, "");
        let parts: Vec<&str> = base.split(" - ").map(str::trim).collect();

        match parts.as_slice() {
            [title, author] if !title.is_empty() && !author.is_empty() => {
                BookMetadata::new(*title, *author)
            }
            _ => BookMetadata::new(stem, UNKNOWN),
        }
    }
}

/// First identifier that looks like an ISBN, trimmed but otherwise as written
pub fn select_isbn(identifiers: &[String]) -> Option<String> {
    identifiers
        .iter()
        .map(|id| id.trim())
        .find(|id| looks_like_isbn(id))
        .map(String::from)
}

/// ISBN heuristic: 10 or 13 digits once prefixes, hyphens and spaces are
/// removed (ISBN-10 may end in `X`), or a hyphenated ISBN shape.
pub fn looks_like_isbn(identifier: &str) -> bool {
    let lower = identifier.trim().to_ascii_lowercase();
    let stripped = lower
        .strip_prefix("urn:isbn:")
        .or_else(|| lower.strip_prefix("isbn:"))
        .unwrap_or(&lower)
        .trim();
    let compact: String = stripped.chars().filter(|c| *c != '-' && *c != ' ').collect();

    // Byte lengths below only equal char counts for ASCII
    let digits_ok = compact.is_ascii()
        && match compact.len() {
            13 => compact.chars().all(|c| c.is_ascii_digit()),
            10 => {
                let (body, check) = compact.split_at(9);
                body.chars().all(|c| c.is_ascii_digit())
                    && check.chars().all(|c| c.is_ascii_digit() || c == 'x')
            }
            _ => false,
        };

    digits_ok || HYPHENATED_ISBN.is_match(identifier.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn filename_with_title_and_author() {
        let meta = MetadataExtractor::from_filename(Path::new("/in/Dune - Frank Herbert.epub"));
        assert_eq!(meta.title, "Dune");
        assert_eq!(meta.author, "Frank Herbert");
    }

    #[test]
    fn filename_strips_numeric_id_suffix() {
        let meta = MetadataExtractor::from_filename(Path::new("Emma - Jane Austen_4821.epub"));
        assert_eq!(meta.title, "Emma");
        assert_eq!(meta.author, "Jane Austen");
    }

    #[test]
    fn filename_without_separator_uses_stem() {
        let meta = MetadataExtractor::from_filename(Path::new("untitled_draft.epub"));
        assert_eq!(meta.title, "untitled_draft");
        assert_eq!(meta.author, UNKNOWN);
    }

    #[test]
    fn filename_with_too_many_parts_uses_stem() {
        let meta = MetadataExtractor::from_filename(Path::new("A - B - C.epub"));
        assert_eq!(meta.title, "A - B - C");
        assert_eq!(meta.author, UNKNOWN);
    }

    #[test]
    fn filename_with_empty_stem() {
        let meta = MetadataExtractor::from_filename(Path::new("/"));
        assert_eq!(meta.title, UNKNOWN);
        assert_eq!(meta.author, UNKNOWN);
    }

    #[test]
    fn pdf_uses_filename() {
        let meta = MetadataExtractor::new()
            .extract(Path::new("/nowhere/Walden - Thoreau.pdf"))
            .unwrap();
        assert_eq!(meta.title, "Walden");
        assert_eq!(meta.author, "Thoreau");
    }

    #[test]
    fn other_extensions_are_unsupported() {
        let result = MetadataExtractor::new().extract(Path::new("/nowhere/notes.txt"));
        assert!(matches!(result, Err(MetadataError::UnsupportedFormat(_))));
    }

    #[test]
    fn isbn_detection() {
        assert!(looks_like_isbn("9780261102217"));
        assert!(looks_like_isbn("978-0-261-10221-7"));
        assert!(looks_like_isbn("urn:isbn:978-0-261-10221-7"));
        assert!(looks_like_isbn("ISBN: 0 261 10221 X"));
        assert!(!looks_like_isbn("urn:uuid:0b6b9c3e-3f43-4b53-9d3c-0e8d5d8e7c11"));
        assert!(!looks_like_isbn("https://example.com/book/42"));
        assert!(!looks_like_isbn("12345"));
    }

    #[test]
    fn isbn_detection_with_multibyte_identifiers() {
        // 10 and 13 bytes long, with a char boundary off byte 9
        assert!(!looks_like_isbn("12345678é"));
        assert!(!looks_like_isbn("urn:isbn:12345678é"));
        assert!(!looks_like_isbn("1234567890é"));
        assert!(!looks_like_isbn("１２３４５６７８９０"));
        assert_eq!(select_isbn(&["12345678é".to_string()]), None);
    }

    #[test]
    fn select_isbn_skips_non_isbn_identifiers() {
        let ids = vec![
            "urn:uuid:1234".to_string(),
            "  978-0-261-10221-7 ".to_string(),
            "9780000000002".to_string(),
        ];
        assert_eq!(select_isbn(&ids).as_deref(), Some("978-0-261-10221-7"));
        assert_eq!(select_isbn(&["calibre:42".to_string()]), None);
    }

    proptest! {
        #[test]
        fn filename_fallback_is_never_empty(stem in "[^/\\\\\\x00]{0,40}") {
            let path = std::path::PathBuf::from(format!("{stem}.epub"));
            let meta = MetadataExtractor::from_filename(&path);
            prop_assert!(!meta.title.trim().is_empty());
            prop_assert!(!meta.author.trim().is_empty());
        }

        #[test]
        fn isbn_heuristic_accepts_any_identifier(id in "\\PC{0,20}") {
            let _ = looks_like_isbn(&id);
        }
    }
}
