use dashmap::DashMap;
use log::{debug, trace};
use oxmin_core::{FileMinifyError, MinifierConfig, MinifyOutput, SourceFile};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::dual::DualEngineMinifier;

/// Remembers minified output by a fingerprint of everything that affects it,
/// so unchanged files are not minified twice. Safe to share between threads.
pub struct CachingMinifier {
    inner: DualEngineMinifier,
    cache: DashMap<String, MinifyOutput>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl CachingMinifier {
    pub fn new(inner: DualEngineMinifier) -> Self {
        Self { inner, cache: DashMap::new(), hits: AtomicUsize::new(0), misses: AtomicUsize::new(0) }
    }

    pub fn config(&self) -> &MinifierConfig {
        self.inner.config()
    }

    /// Minifies `file`, or returns the cached result for identical input.
    /// Failures are never cached.
    pub fn minify_file(&self, file: &SourceFile) -> Result<MinifyOutput, FileMinifyError> {
        let key = self.fingerprint(file);
        if let Some(key) = &key
            && let Some(hit) = self.cache.get(key)
        {
            trace!("Cache hit for {}", file.path);
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(hit.value().clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let output = self.inner.minify_one_file(file)?;
        if let Some(key) = key {
            self.cache.insert(key, output.clone());
        }
        Ok(output)
    }

    /// `None` when the file's map cannot be serialized; such files bypass the cache.
    fn fingerprint(&self, file: &SourceFile) -> Option<String> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.config().node_env.as_bytes());
        hasher.update(&[0]);
        hasher.update(file.path.as_bytes());
        hasher.update(&[0]);
        hasher.update(&file.contents);
        if let Some(map) = &file.source_map {
            hasher.update(&[1]);
            if let Err(e) = map.to_writer(&mut hasher) {
                debug!("Not caching {}: cannot serialize its source map: {}", file.path, e);
                return None;
            }
        }
        Some(hasher.finalize().to_hex().to_string())
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
