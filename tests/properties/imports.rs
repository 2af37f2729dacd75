//! Property tests for `@import` extraction.

use proptest::prelude::*;

use cascade::extract_imports;

fn reference() -> impl Strategy<Value = String> {
    let segment = proptest::string::string_regex("[A-Za-z0-9_-]{1,12}").unwrap();
    proptest::collection::vec(segment, 1..=3).prop_map(|segments| segments.join("/"))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Extraction never panics on arbitrary bytes.
    #[test]
    fn property_extract_never_panics(
        bytes in proptest::collection::vec(any::<u8>(), 0..512)
    ) {
        let _ = extract_imports(&bytes);
    }

    /// PROPERTY: One `@import` per line comes back in file order, duplicates kept.
    #[test]
    fn property_import_lines_extracted_in_order(
        refs in proptest::collection::vec(reference(), 0..8),
        double_quotes in any::<bool>(),
        indent in "[ \t]{0,4}"
    ) {
        let quote = if double_quotes { '"' } else { '\'' };
        let content: String = refs
            .iter()
            .map(|r| format!("{indent}@import {quote}{r}{quote};\nbody {{ margin: 0; }}\n"))
            .collect();

        prop_assert_eq!(extract_imports(content.as_bytes()), refs);
    }

    /// PROPERTY: Lines commented out with `//` never produce imports.
    #[test]
    fn property_line_comments_ignored(
        refs in proptest::collection::vec(reference(), 1..6)
    ) {
        let content: String = refs
            .iter()
            .map(|r| format!("// @import \"{r}\";\n"))
            .collect();

        prop_assert!(extract_imports(content.as_bytes()).is_empty());
    }
}
