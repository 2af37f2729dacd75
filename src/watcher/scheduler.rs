//! Staging of files that need recompilation
//!
//! The listener thread calls [`StagingScheduler::handle_event`] for every
//! notification; the flush loop calls [`StagingScheduler::flush`] on a fixed
//! interval. Several events for the same save collapse into one staged entry,
//! so each file is compiled at most once per flush.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use notify::Event;
use tracing::{debug, warn};

use crate::cache::FileCache;
use crate::compiler::{compile_many, BatchReport, Compiler};
use crate::context::{walker, CompileContext, CompileMap};
use crate::error::{CascadeError, CascadeResult};
use crate::graph::DependencyResolver;
use crate::logging::file_log;
use crate::paths::canonical;

use super::event::{classify, WatchEvent};
use super::notifier::Notifier;

/// How long the listener waits for a notification before rechecking shutdown
const LISTEN_TICK: Duration = Duration::from_millis(50);

/// Tracks the import graph under change and queues root files for compilation
pub struct StagingScheduler {
    ctx: CompileContext,
    files: Arc<FileCache>,
    deps: Arc<DependencyResolver>,
    staged: Mutex<CompileMap>,
    notifier: Mutex<Box<dyn Notifier>>,
}

impl StagingScheduler {
    /// Validate the input root and register it, with every subdirectory, for notifications
    pub fn new(
        ctx: CompileContext,
        files: Arc<FileCache>,
        deps: Arc<DependencyResolver>,
        notifier: Box<dyn Notifier>,
    ) -> CascadeResult<Self> {
        let input = ctx.input_root().to_path_buf();
        if !std::fs::metadata(&input)?.is_dir() {
            return Err(CascadeError::NotADirectory { path: input });
        }

        let scheduler = Self {
            ctx,
            files,
            deps,
            staged: Mutex::new(CompileMap::new()),
            notifier: Mutex::new(notifier),
        };
        scheduler.register_tree(&input)?;
        Ok(scheduler)
    }

    pub fn resolver(&self) -> &DependencyResolver {
        &self.deps
    }

    /// Deep-resolve every root so reverse lookups know about them.
    ///
    /// Failures are logged; the file still gets compiled and reports its own error.
    pub fn warm(&self, roots: &CompileMap) {
        for source in roots.keys() {
            if let Err(e) = self.deps.resolve(source) {
                warn!(path = %source.display(), "could not resolve dependencies: {e}");
            }
        }
    }

    /// Register `root` and every directory below it with the notifier.
    ///
    /// Hidden directories are included; a root may import partials from them.
    pub fn register_tree(&self, root: &Path) -> CascadeResult<()> {
        let mut notifier = lock(&self.notifier);
        for entry in walker(root, false).build() {
            let entry = entry?;
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                notifier.register(entry.path())?;
            }
        }
        Ok(())
    }

    /// React to a change of `path`, returning the entries newly staged because of it.
    pub fn stage(&self, path: &Path) -> CascadeResult<Vec<(PathBuf, PathBuf)>> {
        let path = canonical(path)?;

        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) => metadata,
            // Editor temp files are often gone before their event arrives
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "changed file no longer exists");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        if metadata.is_dir() {
            file_log(true, &path, "adding newly created directory to watch list");
            self.register_tree(&path)?;
            return Ok(Vec::new());
        }

        let extensions = self.ctx.extensions();
        if !extensions.is_stylesheet(&path) {
            return Ok(Vec::new());
        }

        self.files.invalidate(&path)?;
        self.deps.invalidate(&path)?;
        self.deps.resolve(&path)?;

        let mut targets = Vec::new();
        if !extensions.is_private(&path) {
            targets.push(path.clone());
        }
        targets.extend(
            self.deps
                .reverse_resolve(&path)
                .into_iter()
                .filter(|dependent| !extensions.is_private(dependent)),
        );

        let mut newly = Vec::with_capacity(targets.len());
        for source in targets {
            let output = self.ctx.resolve_output_path(&source)?;
            lock(&self.staged).insert(source.clone(), output.clone());
            newly.push((source, output));
        }
        Ok(newly)
    }

    /// Stage everything a notification touches.
    ///
    /// Per-file problems are logged and reported as [`WatchEvent::Error`];
    /// only fatal errors are returned.
    pub fn handle_event(&self, event: &Event, on_event: &dyn Fn(WatchEvent)) -> CascadeResult<()> {
        let (kind, paths) = classify(event);
        if !kind.stages() {
            return Ok(());
        }

        for path in paths {
            let inside = canonical(&path)
                .map(|p| p.starts_with(self.ctx.input_root()))
                .unwrap_or(false);
            if !inside {
                debug!(path = %path.display(), "ignoring change outside the input directory");
                continue;
            }

            match self.stage(&path) {
                Ok(staged) => {
                    for (source, output) in staged {
                        on_event(WatchEvent::FileStaged {
                            path: source.display().to_string(),
                            output: output.display().to_string(),
                        });
                    }
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    file_log(false, &path, format!("could not stage for compilation: {e}"));
                    on_event(WatchEvent::Error {
                        path: Some(path.display().to_string()),
                        message: e.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Consume notifications until shutdown or until the notifier goes away
    pub fn listen(
        &self,
        rx: &Receiver<notify::Result<Event>>,
        running: &AtomicBool,
        on_event: &dyn Fn(WatchEvent),
    ) -> CascadeResult<()> {
        while running.load(Ordering::SeqCst) {
            match rx.recv_timeout(LISTEN_TICK) {
                Ok(Ok(event)) => self.handle_event(&event, on_event)?,
                Ok(Err(e)) => return Err(CascadeError::Watcher(e)),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        Ok(())
    }

    /// Snapshot of what is currently staged
    pub fn staged(&self) -> CompileMap {
        lock(&self.staged).clone()
    }

    /// Compile and clear everything staged so far; `None` when nothing was staged
    pub fn flush(&self, compiler: &dyn Compiler) -> Option<BatchReport> {
        let batch = std::mem::take(&mut *lock(&self.staged));
        if batch.is_empty() {
            return None;
        }
        Some(compile_many(compiler, &batch))
    }
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
