//! Directory registration with the filesystem notifier

use std::path::Path;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::{CascadeError, CascadeResult};

/// Receives directories that should produce change notifications
pub trait Notifier: Send {
    /// Start watching `dir` itself (not its subdirectories)
    fn register(&mut self, dir: &Path) -> CascadeResult<()>;
}

impl Notifier for RecommendedWatcher {
    fn register(&mut self, dir: &Path) -> CascadeResult<()> {
        self.watch(dir, RecursiveMode::NonRecursive)
            .map_err(|source| CascadeError::Register {
                path: dir.to_path_buf(),
                source,
            })
    }
}
