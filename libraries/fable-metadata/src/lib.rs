//! FableFlow Metadata
//!
//! Reading EPUB packages and extracting bibliographic metadata.
//!
//! This crate provides:
//! - `EbookPackage`: a read-only view over the entries of an EPUB zip archive
//! - OPF and `META-INF/container.xml` parsing
//! - `MetadataExtractor`: Dublin Core extraction with filename fallback
//!
//! # Example
//!
//! ```rust,no_run
//! use fable_metadata::MetadataExtractor;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let extractor = MetadataExtractor::new();
//! let metadata = extractor.extract(Path::new("/books/Dune - Frank Herbert.epub"))?;
//! println!("{} by {}", metadata.title, metadata.author);
//! # Ok(())
//! # }
//! ```

mod error;
mod extractor;
pub mod opf;
mod package;

pub use error::{MetadataError, Result};
pub use extractor::{looks_like_isbn, select_isbn, MetadataExtractor, UNKNOWN};
pub use opf::{ManifestItem, PackageDocument};
pub use package::{resolve_href, EbookPackage};
