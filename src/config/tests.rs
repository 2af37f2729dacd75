//! Tests for the config module

use super::loader::{apply_overrides, load_or_default, suggest_key};
use super::types::*;
use crate::error::CascadeError;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.compiler.command, "sassc");
    assert!(config.compiler.args.is_empty());
    assert_eq!(config.compiler.timeout_secs, 30);
    assert_eq!(config.watch.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
    assert_eq!(config.extensions.source, "scss");
    assert_eq!(config.extensions.output, "css");
    assert_eq!(config.extensions.private_prefix, '_');
    assert!(config.paths.input.is_none());
}

#[test]
fn test_config_parse_toml() {
    let toml = r#"
[paths]
input = "styles"
output = "public/css"

[compiler]
command = "sassc"
args = ["--style", "compressed"]
timeout_secs = 5

[watch]
poll_interval_ms = 250
"#;

    let config: Config = toml::from_str(toml).unwrap();

    assert_eq!(config.paths.input, Some(PathBuf::from("styles")));
    assert_eq!(config.paths.output, Some(PathBuf::from("public/css")));
    assert_eq!(config.compiler.args, vec!["--style", "compressed"]);
    assert_eq!(config.compiler.timeout_secs, 5);
    assert_eq!(config.watch.poll_interval().as_millis(), 250);
    assert_eq!(config.extensions.source, "scss");
}

#[test]
fn test_config_partial_sections_use_defaults() {
    let config: Config = toml::from_str("[compiler]\nargs = [\"-I\", \"vendor\"]\n").unwrap();
    assert_eq!(config.compiler.command, "sassc");
    assert_eq!(config.compiler.timeout_secs, 30);
}

#[test]
fn test_config_load_with_warnings_reports_unknown_keys() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cascade.toml");
    fs::write(&path, "[compiler]\ncomand = \"sass\"\n").unwrap();

    let (config, warnings) = Config::load_with_warnings(&path).unwrap();

    assert_eq!(config.compiler.command, "sassc");
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].key, "comand");
    assert_eq!(warnings[0].line, Some(2));
    assert_eq!(warnings[0].suggestion.as_deref(), Some("command"));
    assert!(warnings[0].to_string().contains("did you mean 'command'"));
}

#[test]
fn test_config_load_invalid_toml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cascade.toml");
    fs::write(&path, "[watch]\npoll_interval_ms = \"fast\"\n").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, CascadeError::Config { .. }));
}

#[test]
fn test_load_or_default_prefers_project_file() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("cascade.toml"),
        "[paths]\ninput = \"assets/scss\"\n",
    )
    .unwrap();

    let (config, warnings) = load_or_default(Some(dir.path())).unwrap();
    assert_eq!(config.paths.input, Some(PathBuf::from("assets/scss")));
    assert!(warnings.is_empty());
}

#[test]
fn test_env_overrides() {
    let vars: HashMap<&str, &str> = [
        ("CASCADE_COMPILER", "/usr/local/bin/sassc"),
        ("CASCADE_COMPILER_TIMEOUT_SECS", "12"),
        ("CASCADE_POLL_INTERVAL_MS", "not-a-number"),
    ]
    .into_iter()
    .collect();

    let config = apply_overrides(Config::default(), |key| {
        vars.get(key).map(|v| v.to_string())
    });

    assert_eq!(config.compiler.command, "/usr/local/bin/sassc");
    assert_eq!(config.compiler.timeout_secs, 12);
    // Unparseable values are ignored
    assert_eq!(config.watch.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
}

#[test]
fn test_suggest_key() {
    assert_eq!(suggest_key("ouput").as_deref(), Some("output"));
    assert_eq!(suggest_key("completely_unrelated"), None);
}
