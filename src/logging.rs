//! Per-file log lines
//!
//! Output goes through `tracing`; the binary installs the subscriber.

use std::fmt::Display;
use std::path::Path;

/// Log a message about one file, as success (`info`) or failure (`error`)
pub fn file_log(ok: bool, path: &Path, message: impl Display) {
    if ok {
        tracing::info!(path = %path.display(), "{message}");
    } else {
        tracing::error!(path = %path.display(), "{message}");
    }
}
