//! File watcher for continuous compilation
//!
//! Implements the `watch` command with:
//! - Per-directory notifier registration, including directories created later
//! - Import-graph aware staging (a change to a partial restages its importers)
//! - Coalescing flushes on a fixed interval (100ms default)
//! - Graceful Ctrl+C shutdown
//! - NDJSON output for CI
//!
//! ## Architecture
//!
//! - `StagingScheduler` - Reacts to changes and owns the staged set
//! - `WatchUseCase` - Startup sequence, listener thread and flush loop
//! - `WatchEvent` - Events emitted during watch operation

mod event;
mod notifier;
mod scheduler;
mod use_case;


pub use event::{classify, ChangeKind, WatchEvent, WatchOptions};
pub use notifier::Notifier;
pub use scheduler::StagingScheduler;
pub use use_case::WatchUseCase;
