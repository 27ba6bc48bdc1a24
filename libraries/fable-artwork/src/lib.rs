//! FableFlow Artwork - Ebook cover extraction
//!
//! Locates the cover image inside an EPUB package and produces thumbnails.
//!
//! # Features
//!
//! - Ordered cover lookup: OPF cover meta, manifest IDs, well-known file
//!   names, then any image under an `images/` directory
//! - JPEG thumbnails scaled into a bounding box
//! - LRU caching and base64 encoding for web transfer
//!
//! # Example
//!
//! ```no_run
//! use fable_artwork::{CoverExtractor, THUMBNAIL_HEIGHT, THUMBNAIL_WIDTH};
//! use std::path::Path;
//!
//! let extractor = CoverExtractor::new(64);
//! let path = Path::new("library/Dune - Frank Herbert.epub");
//!
//! match extractor.extract_thumbnail(path, THUMBNAIL_WIDTH, THUMBNAIL_HEIGHT) {
//!     Ok(jpeg) => println!("Thumbnail: {} bytes", jpeg.len()),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

mod cover;
mod error;
mod extractor;
mod thumbnail;
mod types;

// Re-export public API
pub use cover::CoverResolver;
pub use error::{ArtworkError, Result};
pub use extractor::CoverExtractor;
pub use thumbnail::{fit_dimensions, thumbnail, THUMBNAIL_HEIGHT, THUMBNAIL_WIDTH};
pub use types::CoverImage;
