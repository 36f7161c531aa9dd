//! Credential loading from the process environment and an optional `.env` file.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use tracing::debug;

/// Environment variable holding the OpenAI API key.
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

/// An API secret. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for building the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiKey").field(&"[REDACTED]").finish()
    }
}

/// Key-value credentials read from a `.env` file.
#[derive(Clone, Default)]
pub struct Credentials {
    vars: BTreeMap<String, String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("keys", &self.vars.keys().collect::<Vec<_>>())
            .field("values", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    /// Build credentials from a key-value map.
    pub fn from_map(vars: BTreeMap<String, String>) -> Self {
        Self { vars }
    }

    /// Returns a credential value for a key, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

/// Load credentials from a `.env` file.
///
/// A missing file yields empty credentials.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_credentials(path: &Path) -> anyhow::Result<Credentials> {
    if !path.exists() {
        debug!(path = %path.display(), "no .env file found");
        return Ok(Credentials::default());
    }

    let mut vars = BTreeMap::new();
    let iter = dotenvy::from_path_iter(path)
        .with_context(|| format!("failed to read credentials at {}", path.display()))?;

    for item in iter {
        let (key, value) = item.with_context(|| {
            format!(
                "failed to parse key-value entry in credentials file {}",
                path.display()
            )
        })?;
        vars.insert(key, value);
    }

    debug!(path = %path.display(), count = vars.len(), "loaded .env credentials");
    Ok(Credentials { vars })
}

/// Resolve the OpenAI API key.
///
/// Resolution order:
/// 1. `OPENAI_API_KEY` from the process environment
/// 2. `OPENAI_API_KEY` from the loaded `.env` credentials
///
/// Blank values are ignored. Returns `None` if no source provides a key.
pub fn resolve_openai_key(
    credentials: &Credentials,
    env: impl Fn(&str) -> Option<String>,
) -> Option<ApiKey> {
    if let Some(key) = env(OPENAI_API_KEY_VAR) {
        if !key.trim().is_empty() {
            debug!("using OPENAI_API_KEY from environment");
            return Some(ApiKey::new(key));
        }
    }

    if let Some(key) = credentials.get(OPENAI_API_KEY_VAR) {
        if !key.trim().is_empty() {
            debug!("using OPENAI_API_KEY from .env");
            return Some(ApiKey::new(key));
        }
    }

    None
}

/// Resolve the OpenAI API key or fail with a configuration error.
///
/// # Errors
///
/// Returns an error naming the missing variable when no key is configured.
pub fn require_openai_key(
    credentials: &Credentials,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ApiKey> {
    resolve_openai_key(credentials, env).ok_or_else(|| {
        anyhow::anyhow!(
            "missing required credential: {OPENAI_API_KEY_VAR} (set it in the environment or in .env)"
        )
    })
}
