use crate::cover::CoverResolver;
use crate::error::{ArtworkError, Result};
use crate::thumbnail;
use crate::types::CoverImage;
use fable_metadata::EbookPackage;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::warn;

/// Maximum cover size (10MB)
const MAX_COVER_SIZE: usize = 10 * 1024 * 1024;

/// Extracts covers from EPUB files with LRU caching
pub struct CoverExtractor {
    resolver: CoverResolver,
    cache: Arc<Mutex<LruCache<PathBuf, Arc<CoverImage>>>>,
}

impl CoverExtractor {
    /// Create a new cover extractor with the specified cache size
    ///
    /// # Arguments
    /// * `cache_size` - Maximum number of covers to cache (0 keeps a single entry)
    pub fn new(cache_size: usize) -> Self {
        let capacity = NonZeroUsize::new(cache_size).unwrap_or(NonZeroUsize::MIN);

        Self {
            resolver: CoverResolver::new(),
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    fn cache(&self) -> MutexGuard<'_, LruCache<PathBuf, Arc<CoverImage>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Extract the cover of an EPUB file
    pub fn extract(&self, path: &Path) -> Result<CoverImage> {
        // Canonicalize path for consistent cache keys
        let canonical_path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        if let Some(cached) = self.cache().get(&canonical_path) {
            return Ok((**cached).clone());
        }

        let cover = self.extract_from_file(path)?;
        self.cache().put(canonical_path, Arc::new(cover.clone()));
        Ok(cover)
    }

    /// Extract the cover and encode as base64
    pub fn extract_base64(&self, path: &Path) -> Result<String> {
        Ok(self.extract(path)?.to_base64())
    }

    /// Extract the cover and scale it into a `max_width`x`max_height` JPEG
    pub fn extract_thumbnail(&self, path: &Path, max_width: u32, max_height: u32) -> Result<Vec<u8>> {
        let cover = self.extract(path)?;
        thumbnail::thumbnail(&cover.data, max_width, max_height)
    }

    /// Clear the cache
    pub fn clear_cache(&self) {
        self.cache().clear();
    }

    fn extract_from_file(&self, path: &Path) -> Result<CoverImage> {
        if !path.exists() {
            return Err(ArtworkError::FileNotFound(path.to_path_buf()));
        }

        let is_epub = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("epub"));
        if !is_epub {
            return Err(ArtworkError::UnsupportedFormat(path.to_path_buf()));
        }

        let mut package = EbookPackage::open(path)?;
        let (entry_name, data) = self.resolver.resolve(&mut package)?;

        if data.len() > MAX_COVER_SIZE {
            warn!(
                "Cover in {} is too large ({} bytes, max {} bytes), skipping",
                path.display(),
                data.len(),
                MAX_COVER_SIZE
            );
            return Err(ArtworkError::TooLarge(data.len(), MAX_COVER_SIZE));
        }

        Ok(CoverImage::new(entry_name, data))
    }
}
