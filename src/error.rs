//! Error types for Cascade
//!
//! Library code returns [`CascadeResult`]; the binary wraps it in `anyhow`.
//! Per-file compilation failures are not errors, they are reported through
//! [`crate::compiler::CompileOutcome`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Cascade operations
pub type CascadeResult<T> = Result<T, CascadeError>;

/// Main error type for Cascade operations
#[derive(Error, Debug)]
pub enum CascadeError {
    /// An import directive names a file that exists under no naming convention
    #[error("could not find ref `{reference}` (tried {})", format_tried(.tried))]
    ReferenceNotFound {
        reference: String,
        tried: Vec<PathBuf>,
    },

    /// Stat failed for a reason other than the file being absent
    #[error("error when trying to stat ref `{reference}` (which resolved to '{}'): {source}", .path.display())]
    Stat {
        reference: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading a source file failed
    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Computed output path leaves the output root
    #[error("resolved output path '{}' is not part of the output directory '{}'", .path.display(), .root.display())]
    PathEscape { path: PathBuf, root: PathBuf },

    /// Walking a directory tree failed
    #[error("could not walk directory tree: {0}")]
    Walk(#[from] ignore::Error),

    /// Watch mode needs a directory as input
    #[error("input must be a directory: {}", .path.display())]
    NotADirectory { path: PathBuf },

    /// A directory could not be added to the notifier
    #[error("could not watch directory '{}': {source}", .path.display())]
    Register {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    /// Filesystem notifier could not be created or failed while running
    #[error("watcher error: {0}")]
    Watcher(#[from] notify::Error),

    /// First full build in watch mode reported failures
    #[error("bailing due to compilation errors on the first pass ({failed} failed)")]
    InitialBuildFailed { failed: usize },

    /// Invalid configuration file
    #[error("invalid config in {}: {message}", .file.display())]
    Config { file: PathBuf, message: String },
}

impl CascadeError {
    /// Errors that indicate a broken setup rather than a bad source file.
    ///
    /// Watch mode stops on these instead of logging and carrying on.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CascadeError::PathEscape { .. } | CascadeError::Watcher(_)
        )
    }
}

fn format_tried(tried: &[PathBuf]) -> String {
    tried
        .iter()
        .map(|p| format!("'{}'", p.display()))
        .collect::<Vec<_>>()
        .join(" and ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_reference_not_found() {
        let err = CascadeError::ReferenceNotFound {
            reference: "includes/missing".to_string(),
            tried: vec![
                PathBuf::from("src/includes/_missing.scss"),
                PathBuf::from("src/includes/missing.css"),
            ],
        };
        insta::assert_snapshot!(
            err.to_string(),
            @"could not find ref `includes/missing` (tried 'src/includes/_missing.scss' and 'src/includes/missing.css')"
        );
    }

    #[test]
    fn test_error_display_path_escape() {
        let err = CascadeError::PathEscape {
            path: PathBuf::from("../elsewhere/site.css"),
            root: PathBuf::from("out"),
        };
        assert_eq!(
            err.to_string(),
            "resolved output path '../elsewhere/site.css' is not part of the output directory 'out'"
        );
    }

    #[test]
    fn test_register_failure_is_not_fatal() {
        let err = CascadeError::Register {
            path: PathBuf::from("src/gone"),
            source: notify::Error::path_not_found(),
        };
        assert!(!err.is_fatal());
        assert!(err.to_string().starts_with("could not watch directory 'src/gone'"));

        assert!(CascadeError::Watcher(notify::Error::generic("inotify queue overflow")).is_fatal());
    }

    #[test]
    fn test_error_display_initial_build() {
        let err = CascadeError::InitialBuildFailed { failed: 2 };
        assert_eq!(
            err.to_string(),
            "bailing due to compilation errors on the first pass (2 failed)"
        );
    }
}
