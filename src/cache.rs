//! Read-through cache of raw file contents
//!
//! Entries are loaded on first access and kept until [`FileCache::invalidate`]
//! is called for that path. The cache never refreshes itself, so callers that
//! learn about a change on disk must invalidate first.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::error::{CascadeError, CascadeResult};
use crate::paths::canonical;

/// Memoized file contents keyed by canonical path
#[derive(Debug, Default)]
pub struct FileCache {
    entries: RwLock<HashMap<PathBuf, Arc<[u8]>>>,
}

impl FileCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the contents of `path`, reading it from disk on a miss
    pub fn get(&self, path: &Path) -> CascadeResult<Arc<[u8]>> {
        let key = canonical(path)?;

        if let Some(bytes) = self.read_lock().get(&key) {
            return Ok(Arc::clone(bytes));
        }

        let bytes: Arc<[u8]> = std::fs::read(&key)
            .map_err(|source| CascadeError::Read {
                path: key.clone(),
                source,
            })?
            .into();

        // Another reader may have raced us here; keep whichever landed first so
        // every caller observes the same bytes until the next invalidation.
        let mut entries = self.write_lock();
        let stored = entries.entry(key).or_insert(bytes);
        Ok(Arc::clone(stored))
    }

    /// Drop the cached entry for `path`, if any
    pub fn invalidate(&self, path: &Path) -> CascadeResult<()> {
        let key = canonical(path)?;
        self.write_lock().remove(&key);
        Ok(())
    }

    /// Whether `path` currently has a cached entry
    pub fn contains(&self, path: &Path) -> bool {
        canonical(path)
            .map(|key| self.read_lock().contains_key(&key))
            .unwrap_or(false)
    }

    /// Number of cached files
    pub fn len(&self) -> usize {
        self.read_lock().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.read_lock().is_empty()
    }

    fn read_lock(&self) -> std::sync::RwLockReadGuard<'_, HashMap<PathBuf, Arc<[u8]>>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_lock(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<PathBuf, Arc<[u8]>>> {
        self.entries.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn get_reads_file_once() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("site.scss");
        fs::write(&file, "body { color: red; }").unwrap();

        let cache = FileCache::new();
        assert_eq!(&*cache.get(&file).unwrap(), b"body { color: red; }");

        // Changing the file must not be visible until invalidation
        fs::write(&file, "body { color: blue; }").unwrap();
        assert_eq!(&*cache.get(&file).unwrap(), b"body { color: red; }");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidate_forces_reload() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("site.scss");
        fs::write(&file, "a").unwrap();

        let cache = FileCache::new();
        cache.get(&file).unwrap();
        fs::write(&file, "b").unwrap();
        cache.invalidate(&file).unwrap();

        assert!(!cache.contains(&file));
        assert_eq!(&*cache.get(&file).unwrap(), b"b");
    }

    #[test]
    fn invalidate_missing_entry_is_ok() {
        let cache = FileCache::new();
        assert!(cache.invalidate(Path::new("/nowhere/at/all.scss")).is_ok());
        assert!(cache.is_empty());
    }

    #[test]
    fn get_missing_file_is_read_error() {
        let dir = tempdir().unwrap();
        let cache = FileCache::new();
        let err = cache.get(&dir.path().join("absent.scss")).unwrap_err();
        assert!(matches!(err, CascadeError::Read { .. }));
        assert!(cache.is_empty());
    }

    #[test]
    fn concurrent_gets_share_one_entry() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("shared.scss");
        fs::write(&file, "shared").unwrap();

        let cache = Arc::new(FileCache::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let file = file.clone();
                std::thread::spawn(move || cache.get(&file).unwrap())
            })
            .collect();

        for handle in handles {
            assert_eq!(&*handle.join().unwrap(), b"shared");
        }
        assert_eq!(cache.len(), 1);
    }
}
