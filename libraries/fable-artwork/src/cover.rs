//! Cover image resolution inside an EPUB package

use crate::error::{ArtworkError, Result};
use fable_metadata::opf::{self, is_image_name, PackageDocument};
use fable_metadata::{resolve_href, EbookPackage};
use tracing::debug;

/// Well-known cover file names, matched case-insensitively as suffixes
const COVER_CANDIDATES: &[&str] = &[
    "cover.jpg",
    "cover.jpeg",
    "cover.png",
    "cover.gif",
    "cover-image.jpg",
    "cover-image.jpeg",
    "cover-image.png",
    "titlepage.jpg",
    "titlepage.jpeg",
    "titlepage.png",
    "front-cover.jpg",
    "front-cover.jpeg",
    "front-cover.png",
    "immagine_png.jpeg",
    "immagine_png.jpg",
];

/// Root document name plus its parsed OPF, when available
struct OpfContext {
    root: String,
    document: PackageDocument,
}

type Strategy = fn(&mut EbookPackage, Option<&OpfContext>) -> Option<String>;

/// Ordered lookups; each yields an entry name to try
const STRATEGIES: &[(&str, Strategy)] = &[
    ("cover meta", from_cover_meta),
    ("manifest id", from_manifest_id),
    ("candidate name", from_candidate_names),
    ("images directory", from_images_directory),
];

/// Locates the cover image of an EPUB package
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverResolver;

impl CoverResolver {
    pub fn new() -> Self {
        Self
    }

    /// Find the cover, returning the entry name and its bytes.
    ///
    /// A strategy whose entry cannot be read, or is empty, is treated as a
    /// miss and the next one is tried.
    pub fn resolve(&self, package: &mut EbookPackage) -> Result<(String, Vec<u8>)> {
        let context = load_opf(package);

        for (label, strategy) in STRATEGIES {
            let Some(entry) = strategy(package, context.as_ref()) else {
                continue;
            };
            match package.read_entry(&entry) {
                Ok(data) if !data.is_empty() => {
                    debug!("Cover {} found via {} in {:?}", entry, label, package.path());
                    return Ok((entry, data));
                }
                Ok(_) => debug!("Cover candidate {} is empty", entry),
                Err(e) => debug!("Cover candidate {} unreadable: {}", entry, e),
            }
        }

        Err(ArtworkError::NotFound)
    }
}

fn load_opf(package: &mut EbookPackage) -> Option<OpfContext> {
    let root = package.find_root_document().ok()?;
    let xml = package.read_entry_string(&root).ok()?;
    let document = opf::parse_package(&xml).ok()?;
    Some(OpfContext { root, document })
}

fn from_cover_meta(_package: &mut EbookPackage, context: Option<&OpfContext>) -> Option<String> {
    let context = context?;
    let id = context.document.cover_id()?;
    let item = context.document.manifest_item(id)?;
    Some(resolve_href(&context.root, &item.href))
}

fn from_manifest_id(_package: &mut EbookPackage, context: Option<&OpfContext>) -> Option<String> {
    let context = context?;
    let images = || context.document.manifest.iter().filter(|item| item.is_image());

    let item = images()
        .find(|item| item.id == "cover")
        .or_else(|| images().find(|item| item.id.to_ascii_lowercase().contains("cover")))?;
    Some(resolve_href(&context.root, &item.href))
}

fn from_candidate_names(package: &mut EbookPackage, _context: Option<&OpfContext>) -> Option<String> {
    COVER_CANDIDATES.iter().find_map(|candidate| {
        package
            .entry_names()
            .iter()
            .find(|entry| entry.to_ascii_lowercase().ends_with(candidate))
            .cloned()
    })
}

fn from_images_directory(
    package: &mut EbookPackage,
    _context: Option<&OpfContext>,
) -> Option<String> {
    package
        .entry_names()
        .iter()
        .find(|entry| {
            let lower = entry.to_ascii_lowercase();
            (lower.starts_with("images/") || lower.contains("/images/")) && is_image_name(&lower)
        })
        .cloned()
}
