//! Configuration loading and validation.
//!
//! Loads settings from `./config.toml` (or `$JSON_EXTRACTOR_CONFIG`).
//! Every section is optional; a missing file yields defaults.
//!
//! Precedence: env vars > config file > defaults.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::extract::Strategy;

/// Environment variable overriding the config file path.
pub const CONFIG_PATH_VAR: &str = "JSON_EXTRACTOR_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Text-generation service settings.
    pub openai: OpenAiConfig,
    /// Record log location.
    pub storage: StorageConfig,
    /// Log verbosity and optional file output.
    pub logging: LoggingConfig,
    /// Interactive shell behaviour.
    pub shell: ShellConfig,
    /// Overrides rejected while loading; reported once logging is up.
    #[serde(skip)]
    warnings: Vec<String>,
}

/// Text-generation service settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API root, without `/chat/completions`.
    pub base_url: String,
    /// Model name.
    pub model: String,
    /// Output length cap per extraction.
    pub max_tokens: u32,
    /// Sampling temperature; `0.0` is the most deterministic.
    pub temperature: f32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: crate::providers::openai::OPENAI_API_BASE.to_owned(),
            model: "gpt-4o-2024-08-06".to_owned(),
            max_tokens: 150,
            temperature: 0.0,
        }
    }
}

/// Record log location.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// JSON-lines file receiving each extracted record.
    pub log_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            log_file: PathBuf::from("user-data.json"),
        }
    }
}

/// Log verbosity and optional file output.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    /// Directory for rotated JSON logs in shell mode.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            dir: None,
        }
    }
}

/// Interactive shell behaviour.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShellConfig {
    /// Strategy selected when a session starts.
    pub default_mode: Strategy,
}

impl Config {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// `explicit_path` (from `--config`) wins over `$JSON_EXTRACTOR_CONFIG`;
    /// an explicitly named file must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(explicit_path: Option<&Path>) -> anyhow::Result<Self> {
        Self::load_with(explicit_path, |key| std::env::var(key).ok())
    }

    /// [`Config::load`] with a custom env resolver (for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_with(
        explicit_path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let (path, required) = match explicit_path {
            Some(p) => (p.to_path_buf(), true),
            None => match env(CONFIG_PATH_VAR) {
                Some(p) => (PathBuf::from(p), true),
                None => (PathBuf::from("config.toml"), false),
            },
        };

        let mut config = match std::fs::read_to_string(&path) {
            Ok(contents) => {
                tracing::debug!(path = %path.display(), "loading config from file");
                Self::from_toml(&contents)
                    .with_context(|| format!("failed to parse config at {}", path.display()))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                tracing::debug!("no config file found, using defaults");
                Self::default()
            }
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "failed to read config at {}: {e}",
                    path.display()
                ))
            }
        };

        config.apply_overrides(env);
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML string into config.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or has unknown keys.
    pub fn from_toml(toml_str: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(toml_str).context("failed to parse config TOML")?;
        Ok(config)
    }

    /// Apply environment variable overrides (env > config > defaults).
    ///
    /// Invalid values are skipped and collected in [`Config::warnings`].
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("JSON_EXTRACTOR_MODEL") {
            self.openai.model = v;
        }
        if let Some(v) = env("JSON_EXTRACTOR_BASE_URL") {
            self.openai.base_url = v;
        }
        if let Some(v) = env("JSON_EXTRACTOR_MAX_TOKENS") {
            match v.parse() {
                Ok(n) => self.openai.max_tokens = n,
                Err(e) => self.warnings.push(format!(
                    "ignoring invalid env override JSON_EXTRACTOR_MAX_TOKENS={v:?}: {e}"
                )),
            }
        }
        if let Some(v) = env("JSON_EXTRACTOR_LOG_FILE") {
            self.storage.log_file = PathBuf::from(v);
        }
        if let Some(v) = env("JSON_EXTRACTOR_LOG_LEVEL") {
            self.logging.level = v;
        }
    }

    /// Overrides that were ignored, in the order they were found.
    ///
    /// Config is loaded before any subscriber exists, so the caller logs
    /// these after initialising logging.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Reject settings the service would refuse anyway.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid field.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.openai.model.trim().is_empty() {
            anyhow::bail!("openai.model must not be empty");
        }
        if self.openai.base_url.trim().is_empty() {
            anyhow::bail!("openai.base_url must not be empty");
        }
        if self.openai.max_tokens == 0 {
            anyhow::bail!("openai.max_tokens must be greater than zero");
        }
        if !(0.0..=2.0).contains(&self.openai.temperature) {
            anyhow::bail!(
                "openai.temperature must be between 0.0 and 2.0, got {}",
                self.openai.temperature
            );
        }
        if self.storage.log_file.as_os_str().is_empty() {
            anyhow::bail!("storage.log_file must not be empty");
        }
        Ok(())
    }
}
