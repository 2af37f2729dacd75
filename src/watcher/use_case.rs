//! Watch Use Case implementation

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::thread;

use notify::{RecommendedWatcher, Watcher};
use tracing::info;

use crate::cache::FileCache;
use crate::compiler::{compile_many, BatchReport, Compiler};
use crate::error::{CascadeError, CascadeResult};
use crate::graph::DependencyResolver;

use super::event::{WatchEvent, WatchOptions};
use super::scheduler::StagingScheduler;

/// Watch Use Case
///
/// Compiles every root once, then recompiles whatever changes touch until
/// the running flag is cleared. This is the entry point for `cascade watch`.
pub struct WatchUseCase {
    options: WatchOptions,
}

impl WatchUseCase {
    /// Create a new WatchUseCase
    pub fn new(options: WatchOptions) -> Self {
        Self { options }
    }

    /// Start watching (blocking)
    ///
    /// Returns an error if setup fails, if the first full build has any
    /// failure, or if the notifier breaks. Otherwise blocks until `running`
    /// is set to false.
    pub fn start<F>(
        &self,
        compiler: &dyn Compiler,
        running: &AtomicBool,
        on_event: F,
    ) -> CascadeResult<()>
    where
        F: Fn(WatchEvent) + Sync,
    {
        let ctx = &self.options.context;

        let (tx, rx) = channel();
        let notifier = RecommendedWatcher::new(tx, notify::Config::default())?;

        let files = Arc::new(FileCache::new());
        let deps = Arc::new(DependencyResolver::new(
            Arc::clone(&files),
            ctx.extensions().clone(),
        ));
        let scheduler = StagingScheduler::new(ctx.clone(), files, deps, Box::new(notifier))?;

        on_event(WatchEvent::WatchStarted {
            input: ctx.input_root().display().to_string(),
            output: ctx.output_root().display().to_string(),
        });

        let compilable = ctx.find_compilable()?;
        scheduler.warm(&compilable);
        info!(
            roots = compilable.len(),
            resolved = scheduler.resolver().resolved_count(),
            "dependency graph warmed"
        );

        let scheduler = &scheduler;
        let on_event = &on_event;

        thread::scope(|s| {
            let listener = s.spawn(move || scheduler.listen(&rx, running, on_event));

            on_event(WatchEvent::CompileStarted {
                files: compilable.len(),
            });
            let report = compile_many(compiler, &compilable);
            emit_complete(on_event, &report);

            if report.has_failures() {
                running.store(false, Ordering::SeqCst);
                join(listener)?;
                return Err(CascadeError::InitialBuildFailed {
                    failed: report.failed.len(),
                });
            }

            while running.load(Ordering::SeqCst) && !listener.is_finished() {
                if let Some(report) = scheduler.flush(compiler) {
                    emit_complete(on_event, &report);
                }
                thread::sleep(self.options.poll_interval);
            }

            running.store(false, Ordering::SeqCst);
            join(listener)
        })?;

        on_event(WatchEvent::Shutdown);
        Ok(())
    }
}

fn emit_complete(on_event: &impl Fn(WatchEvent), report: &BatchReport) {
    on_event(WatchEvent::CompileComplete {
        compiled: report.compiled.len(),
        failed: report.failed.len(),
    });
}

fn join(handle: thread::ScopedJoinHandle<'_, CascadeResult<()>>) -> CascadeResult<()> {
    match handle.join() {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
