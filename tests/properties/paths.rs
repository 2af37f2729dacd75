//! Property tests for lexical path handling and output mapping.

use std::path::{Path, PathBuf};

use proptest::prelude::*;

use cascade::paths::{normalize, relative_to};
use cascade::{CompileContext, Extensions};

fn relative_suffix() -> impl Strategy<Value = String> {
    let segment = proptest::string::string_regex("[A-Za-z0-9_-]{1,12}").unwrap();
    proptest::collection::vec(segment, 1..=4).prop_map(|segments| segments.join("/"))
}

fn messy_path() -> impl Strategy<Value = String> {
    let segment = prop_oneof![
        proptest::string::string_regex("[A-Za-z0-9_-]{1,8}").unwrap(),
        Just(".".to_string()),
        Just("..".to_string()),
    ];
    proptest::collection::vec(segment, 0..=8).prop_map(|segments| format!("/{}", segments.join("/")))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Normalizing twice changes nothing, and no `.`/`..` survive in absolute paths.
    #[test]
    fn property_normalize_idempotent(p in messy_path()) {
        let once = normalize(Path::new(&p));
        prop_assert_eq!(normalize(&once), once.clone());
        prop_assert!(once
            .components()
            .all(|c| !matches!(c, std::path::Component::CurDir | std::path::Component::ParentDir)));
    }

    /// PROPERTY: A path below a base is recovered by joining its relative form.
    #[test]
    fn property_relative_to_round_trip(base in relative_suffix(), rest in relative_suffix()) {
        let base = PathBuf::from("/").join(base);
        let path = base.join(&rest);
        prop_assert_eq!(relative_to(&path, &base), PathBuf::from(&rest));
    }

    /// PROPERTY: Every source file under the input root maps below the output root.
    #[test]
    fn property_output_path_stays_in_output_root(rest in relative_suffix()) {
        let ctx = CompileContext::new("/project/scss", "/project/css", Extensions::default()).unwrap();
        let source = Path::new("/project/scss").join(format!("{rest}.scss"));

        let output = ctx.resolve_output_path(&source).unwrap();

        prop_assert!(output.starts_with("/project/css"));
        prop_assert_eq!(output.extension().and_then(|e| e.to_str()), Some("css"));
        prop_assert_eq!(output, Path::new("/project/css").join(format!("{rest}.css")));
    }
}
