//! Import directive scanning
//!
//! A textual scan, not a parser: any line that looks like
//! `@import "ref"` or `@import 'ref'` counts, optionally preceded by
//! whitespace and one non-slash character (list markers, `*` in doc blocks).
//! Directives inside block comments are therefore still reported.

use once_cell::sync::Lazy;
use regex::bytes::Regex;

static IMPORT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*([^/]?)\s*@import ('|")([^'"]+)('|")"#)
        .expect("import pattern is valid")
});

/// Extract every quoted import reference from `contents`, in textual order
pub fn extract_imports(contents: &[u8]) -> Vec<String> {
    IMPORT_PATTERN
        .captures_iter(contents)
        .filter_map(|caps| caps.get(3))
        .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
        .collect()
}
