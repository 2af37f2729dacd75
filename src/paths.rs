//! File identity and naming conventions
//!
//! Every graph key is an absolute, lexically normalised path. Symlinks are not
//! resolved so that a file which has just been deleted still maps to the same
//! key it had while it existed.

use std::io;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File extensions and the private-file prefix used by a compilation context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extensions {
    /// Primary source extension, without the dot
    #[serde(default = "default_source")]
    pub source: String,
    /// Compiled output extension, without the dot
    #[serde(default = "default_output")]
    pub output: String,
    /// Leading character that marks a source file as a partial
    #[serde(default = "default_private_prefix")]
    pub private_prefix: char,
}

impl Default for Extensions {
    fn default() -> Self {
        Self {
            source: default_source(),
            output: default_output(),
            private_prefix: default_private_prefix(),
        }
    }
}

fn default_source() -> String {
    "scss".to_string()
}

fn default_output() -> String {
    "css".to_string()
}

fn default_private_prefix() -> char {
    '_'
}

impl Extensions {
    /// Whether the path has the source or the output extension
    pub fn is_stylesheet(&self, path: &Path) -> bool {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext == self.source || ext == self.output,
            None => false,
        }
    }

    /// Whether the path is a source file (not an output file)
    pub fn is_source(&self, path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some(self.source.as_str())
    }

    /// Whether the path is a compiled output file
    pub fn is_output(&self, path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some(self.output.as_str())
    }

    /// Whether the file is only meant to be imported.
    ///
    /// Source files are private when their name starts with the private
    /// prefix. Output-extension files are always private.
    pub fn is_private(&self, path: &Path) -> bool {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext == self.source => path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(self.private_prefix))
                .unwrap_or(false),
            Some(ext) => ext == self.output,
            None => false,
        }
    }
}

/// Make `path` absolute against the working directory and normalise it
pub fn canonical(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(normalize(path))
    } else {
        Ok(normalize(&std::env::current_dir()?.join(path)))
    }
}

/// Lexically remove `.` and `..` components
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                ) && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Lexical path from `base` to `path`, using `..` where `path` is outside `base`.
///
/// Both paths are expected to be absolute and normalised.
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let mut path_iter = path.components().peekable();
    let mut base_iter = base.components().peekable();

    while let (Some(a), Some(b)) = (path_iter.peek(), base_iter.peek()) {
        if a != b {
            break;
        }
        path_iter.next();
        base_iter.next();
    }

    let mut rel = PathBuf::new();
    for _ in base_iter {
        rel.push("..");
    }
    for component in path_iter {
        rel.push(component.as_os_str());
    }
    rel
}
