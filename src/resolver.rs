//! Import reference lookup
//!
//! Maps a raw `@import` reference to a file on disk. Extensionless references
//! try the partial naming convention (`dir/_name.scss`) first and fall back to
//! a compiled stylesheet (`dir/name.css`). References that carry an extension
//! are taken literally.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{CascadeError, CascadeResult};
use crate::paths::{normalize, Extensions};

/// Resolve `reference` relative to `base_dir`
pub fn resolve_ref(
    base_dir: &Path,
    reference: &str,
    extensions: &Extensions,
) -> CascadeResult<PathBuf> {
    let ref_path = Path::new(reference);
    let dir = base_dir.join(ref_path.parent().unwrap_or_else(|| Path::new("")));
    let base_name = ref_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let candidates = if ref_path.extension().is_none() {
        vec![
            dir.join(format!(
                "{}{}.{}",
                extensions.private_prefix, base_name, extensions.source
            )),
            dir.join(format!("{}.{}", base_name, extensions.output)),
        ]
    } else {
        vec![dir.join(&base_name)]
    };

    let tried: Vec<PathBuf> = candidates.iter().map(|p| normalize(p)).collect();
    for candidate in &tried {
        if is_regular_file(reference, candidate)? {
            return Ok(candidate.clone());
        }
    }

    Err(CascadeError::ReferenceNotFound {
        reference: reference.to_string(),
        tried,
    })
}

fn is_regular_file(reference: &str, path: &Path) -> CascadeResult<bool> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(!meta.is_dir()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(source) => Err(CascadeError::Stat {
            reference: reference.to_string(),
            path: path.to_path_buf(),
            source,
        }),
    }
}
