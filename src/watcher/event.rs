//! Watch event types and options

use std::path::PathBuf;
use std::time::Duration;

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind};
use serde::Serialize;

use crate::config::DEFAULT_POLL_INTERVAL_MS;
use crate::context::CompileContext;

/// Watch options
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Input/output roots and naming conventions
    pub context: CompileContext,
    /// How often staged files are flushed to the compiler
    pub poll_interval: Duration,
}

impl WatchOptions {
    /// Create new watch options with the default poll interval
    pub fn new(context: CompileContext) -> Self {
        Self {
            context,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }

    /// Set the flush interval
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// Watch event types for NDJSON output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WatchEvent {
    WatchStarted {
        input: String,
        output: String,
    },
    FileStaged {
        path: String,
        output: String,
    },
    CompileStarted {
        files: usize,
    },
    CompileComplete {
        compiled: usize,
        failed: usize,
    },
    Error {
        path: Option<String>,
        message: String,
    },
    Shutdown,
}

impl WatchEvent {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// What a filesystem notification means for staging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Write,
    Other,
}

impl ChangeKind {
    /// Whether notifications of this kind lead to staging
    pub fn stages(self) -> bool {
        matches!(self, ChangeKind::Create | ChangeKind::Write)
    }
}

impl From<&EventKind> for ChangeKind {
    fn from(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_) => ChangeKind::Create,
            // Editors that save through a temp file land here
            EventKind::Modify(ModifyKind::Name(RenameMode::To | RenameMode::Both)) => {
                ChangeKind::Create
            }
            EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any) => ChangeKind::Write,
            _ => ChangeKind::Other,
        }
    }
}

/// Classify a notification and pick the paths it concerns.
///
/// For a rename reported with both ends, only the destination matters.
pub fn classify(event: &Event) -> (ChangeKind, Vec<PathBuf>) {
    let kind = ChangeKind::from(&event.kind);
    let paths = match event.kind {
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            event.paths.last().cloned().into_iter().collect()
        }
        _ => event.paths.clone(),
    };
    (kind, paths)
}
