//! Cascade - incremental stylesheet build orchestrator
//!
//! Cascade drives an external SCSS compiler over an input tree. It tracks
//! `@import` dependencies between stylesheets so that, in watch mode, a change
//! to a partial recompiles exactly the root files that pull it in.

pub mod cache;
pub mod compiler;
pub mod config;
pub mod context;
pub mod error;
pub mod graph;
pub mod imports;
pub mod logging;
pub mod paths;
pub mod resolver;
pub mod watcher;

// Re-exports for convenience
pub use cache::FileCache;
pub use compiler::{compile_many, BatchReport, CommandCompiler, CompileOutcome, Compiler};
pub use config::Config;
pub use context::{CompileContext, CompileMap};
pub use error::{CascadeError, CascadeResult};
pub use graph::DependencyResolver;
pub use imports::extract_imports;
pub use paths::Extensions;
pub use resolver::resolve_ref;
pub use watcher::{StagingScheduler, WatchEvent, WatchOptions, WatchUseCase};
