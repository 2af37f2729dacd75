//! Compilation context
//!
//! Ties an input tree to an output tree: where compiled files go, and which
//! source files are roots that get compiled directly.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::{CascadeError, CascadeResult};
use crate::paths::{canonical, normalize, relative_to, Extensions};

/// Source files mapped to the output path each one compiles to
pub type CompileMap = BTreeMap<PathBuf, PathBuf>;

/// Input/output roots and naming conventions for one compilation run
#[derive(Debug, Clone)]
pub struct CompileContext {
    input_root: PathBuf,
    output_root: PathBuf,
    extensions: Extensions,
}

impl CompileContext {
    /// Create a context. Both roots are made absolute immediately.
    pub fn new(
        input_root: impl AsRef<Path>,
        output_root: impl AsRef<Path>,
        extensions: Extensions,
    ) -> CascadeResult<Self> {
        Ok(Self {
            input_root: canonical(input_root.as_ref())?,
            output_root: canonical(output_root.as_ref())?,
            extensions,
        })
    }

    pub fn input_root(&self) -> &Path {
        &self.input_root
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Output path for a source file under the input root.
    ///
    /// The path is mirrored below the output root and the source extension is
    /// swapped for the output extension. A result outside the output root is
    /// a configuration defect and reported as [`CascadeError::PathEscape`].
    pub fn resolve_output_path(&self, source: &Path) -> CascadeResult<PathBuf> {
        let source = canonical(source)?;
        let rel = relative_to(&source, &self.input_root);

        let mut output = normalize(&self.output_root.join(rel));
        if self.extensions.is_source(&output) {
            output.set_extension(&self.extensions.output);
        }

        if output == self.output_root || !output.starts_with(&self.output_root) {
            return Err(CascadeError::PathEscape {
                path: output,
                root: self.output_root.clone(),
            });
        }

        Ok(output)
    }

    /// Every non-private source file under the input root, with its output path.
    ///
    /// Hidden files and directories are skipped.
    pub fn find_compilable(&self) -> CascadeResult<CompileMap> {
        let mut compilable = CompileMap::new();

        for entry in walker(&self.input_root, true).build() {
            let entry = entry?;
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let path = entry.path();
            if self.extensions.is_source(path) && !self.extensions.is_private(path) {
                let source = canonical(path)?;
                let output = self.resolve_output_path(&source)?;
                compilable.insert(source, output);
            }
        }

        Ok(compilable)
    }
}

/// Directory walker shared by root discovery and watch registration
pub(crate) fn walker(root: &Path, skip_hidden: bool) -> WalkBuilder {
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .hidden(skip_hidden)
        .follow_links(false);
    builder
}
