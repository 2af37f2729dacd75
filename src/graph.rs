//! Import graph resolution
//!
//! [`DependencyResolver`] memoizes two views of the import graph:
//!
//! - **shallow**: the files a stylesheet imports directly, in textual order
//! - **deep**: every file reachable through imports, excluding the file itself
//!
//! Invalidation is lazy and does not cascade. Invalidating `p` drops only
//! `p`'s own entries; deep sets of other files that contain `p` keep listing it
//! until they are invalidated themselves. Reverse lookups scan the deep cache,
//! so they only see files that have already been deep-resolved.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::trace;

use crate::cache::FileCache;
use crate::error::CascadeResult;
use crate::imports::extract_imports;
use crate::paths::{canonical, Extensions};
use crate::resolver::resolve_ref;

type ShallowMap = HashMap<PathBuf, Arc<[PathBuf]>>;
type DeepMap = HashMap<PathBuf, Arc<BTreeSet<PathBuf>>>;

/// Resolves and caches the import graph of a stylesheet tree
#[derive(Debug)]
pub struct DependencyResolver {
    files: Arc<FileCache>,
    extensions: Extensions,
    shallow: Mutex<ShallowMap>,
    deep: Mutex<DeepMap>,
}

impl DependencyResolver {
    /// Create a resolver reading file contents through `files`
    pub fn new(files: Arc<FileCache>, extensions: Extensions) -> Self {
        Self {
            files,
            extensions,
            shallow: Mutex::new(HashMap::new()),
            deep: Mutex::new(HashMap::new()),
        }
    }

    /// Files imported directly by `path`.
    ///
    /// Fails as a whole if any single import cannot be resolved, in which case
    /// nothing is cached for `path`.
    pub fn shallow_resolve(&self, path: &Path) -> CascadeResult<Arc<[PathBuf]>> {
        let key = canonical(path)?;

        if let Some(deps) = lock(&self.shallow).get(&key) {
            return Ok(Arc::clone(deps));
        }

        let contents = self.files.get(&key)?;
        let base_dir = key.parent().unwrap_or_else(|| Path::new("/"));

        let deps = extract_imports(&contents)
            .iter()
            .map(|reference| resolve_ref(base_dir, reference, &self.extensions))
            .collect::<CascadeResult<Vec<_>>>()?;
        let deps: Arc<[PathBuf]> = deps.into();

        trace!(path = %key.display(), imports = deps.len(), "shallow resolved");
        lock(&self.shallow).insert(key, Arc::clone(&deps));
        Ok(deps)
    }

    /// Every file reachable from `path` through imports, excluding `path`.
    ///
    /// Import cycles are tolerated. Compiled output files are terminal: they
    /// are part of the result but their own contents are never scanned. The
    /// result is cached under the canonical form of `path`, however it was
    /// spelled by the caller.
    pub fn resolve(&self, path: &Path) -> CascadeResult<Arc<BTreeSet<PathBuf>>> {
        let root = canonical(path)?;

        if let Some(deps) = lock(&self.deep).get(&root) {
            return Ok(Arc::clone(deps));
        }

        let mut scanned: HashSet<PathBuf> = HashSet::new();
        let mut unscanned: VecDeque<PathBuf> = VecDeque::from([root.clone()]);

        while let Some(current) = unscanned.pop_front() {
            if !scanned.insert(current.clone()) || self.extensions.is_output(&current) {
                continue;
            }
            for dep in self.shallow_resolve(&current)?.iter() {
                if !scanned.contains(dep) {
                    unscanned.push_back(dep.clone());
                }
            }
        }

        scanned.remove(&root);
        let deps: Arc<BTreeSet<PathBuf>> = Arc::new(scanned.into_iter().collect());

        trace!(path = %root.display(), deps = deps.len(), "deep resolved");
        lock(&self.deep).insert(root, Arc::clone(&deps));
        Ok(deps)
    }

    /// Files already deep-resolved whose dependency set contains `path`.
    ///
    /// Never triggers resolution and never fails; a path that cannot be made
    /// absolute simply has no dependents.
    pub fn reverse_resolve(&self, path: &Path) -> Vec<PathBuf> {
        let Ok(target) = canonical(path) else {
            return Vec::new();
        };

        let mut dependents: Vec<PathBuf> = lock(&self.deep)
            .iter()
            .filter(|(_, deps)| deps.contains(&target))
            .map(|(other, _)| other.clone())
            .collect();
        dependents.sort();
        dependents
    }

    /// Drop the shallow and deep entries for exactly `path`
    pub fn invalidate(&self, path: &Path) -> CascadeResult<()> {
        let key = canonical(path)?;
        lock(&self.shallow).remove(&key);
        lock(&self.deep).remove(&key);
        Ok(())
    }

    /// Number of files with a cached deep dependency set
    pub fn resolved_count(&self) -> usize {
        lock(&self.deep).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
