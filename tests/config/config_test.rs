//! Coverage for config file loading and env precedence.

use std::collections::HashMap;
use std::path::PathBuf;

use json_extractor::config::{Config, CONFIG_PATH_VAR};
use json_extractor::extract::Strategy;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    move |key| map.get(key).cloned()
}

fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
    let tmp = tempfile::tempdir().expect("temp dir");
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, contents).expect("write config");
    (tmp, path)
}

#[test]
fn file_values_override_defaults() {
    let (_tmp, path) = write_config(
        r#"
[openai]
model = "gpt-4o-mini"
max_tokens = 200

[storage]
log_file = "contacts.jsonl"

[shell]
default_mode = "function-calling"
"#,
    );

    let config = Config::load_with(Some(&path), env_from(&[])).expect("loads");
    assert_eq!(config.openai.model, "gpt-4o-mini");
    assert_eq!(config.openai.max_tokens, 200);
    assert_eq!(config.storage.log_file, PathBuf::from("contacts.jsonl"));
    assert_eq!(config.shell.default_mode, Strategy::FunctionCalling);
    assert_eq!(config.openai.base_url, "https://api.openai.com/v1");
}

#[test]
fn env_overrides_file() {
    let (_tmp, path) = write_config("[openai]\nmodel = \"from-file\"\n");

    let config = Config::load_with(
        Some(&path),
        env_from(&[
            ("JSON_EXTRACTOR_MODEL", "from-env"),
            ("JSON_EXTRACTOR_LOG_FILE", "/tmp/records.json"),
        ]),
    )
    .expect("loads");
    assert_eq!(config.openai.model, "from-env");
    assert_eq!(config.storage.log_file, PathBuf::from("/tmp/records.json"));
}

#[test]
fn invalid_numeric_override_is_ignored() {
    let (_tmp, path) = write_config("");
    let config = Config::load_with(
        Some(&path),
        env_from(&[("JSON_EXTRACTOR_MAX_TOKENS", "lots")]),
    )
    .expect("loads");
    assert_eq!(config.openai.max_tokens, 150);
    assert!(config
        .warnings()
        .iter()
        .any(|w| w.contains("JSON_EXTRACTOR_MAX_TOKENS") && w.contains("lots")));
}

#[test]
fn valid_overrides_produce_no_warnings() {
    let (_tmp, path) = write_config("");
    let config = Config::load_with(
        Some(&path),
        env_from(&[("JSON_EXTRACTOR_MAX_TOKENS", "300")]),
    )
    .expect("loads");
    assert_eq!(config.openai.max_tokens, 300);
    assert!(config.warnings().is_empty());
}

#[test]
fn config_path_from_env_must_exist() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let missing = tmp.path().join("nope.toml");
    let missing_str = missing.to_string_lossy().into_owned();
    let result = Config::load_with(None, env_from(&[(CONFIG_PATH_VAR, missing_str.as_str())]));
    assert!(result.is_err());
}

#[test]
fn explicit_path_must_exist() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let result = Config::load_with(Some(&tmp.path().join("absent.toml")), env_from(&[]));
    assert!(result.is_err());
}

#[test]
fn out_of_range_temperature_is_rejected() {
    let (_tmp, path) = write_config("[openai]\ntemperature = 3.5\n");
    let err = Config::load_with(Some(&path), env_from(&[])).expect_err("temperature too high");
    assert!(err.to_string().contains("temperature"));
}

#[test]
fn zero_max_tokens_is_rejected() {
    let (_tmp, path) = write_config("[openai]\nmax_tokens = 0\n");
    assert!(Config::load_with(Some(&path), env_from(&[])).is_err());
}
