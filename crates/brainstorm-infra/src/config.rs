//! Configuration loader for Brainstorm.
//!
//! Reads `config.toml` (by default from the data directory, `~/.brainstorm/`
//! in production) into [`AppConfig`] and resolves provider credentials from
//! the environment. A missing file means defaults; a malformed one is an error.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use brainstorm_types::config::{AppConfig, ProviderConfig};
use brainstorm_types::error::ConfigError;

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `BRAINSTORM_DATA_DIR` environment variable
/// 2. `~/.brainstorm`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("BRAINSTORM_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".brainstorm");
    }

    PathBuf::from(".brainstorm")
}

/// Config file location: `BRAINSTORM_CONFIG`, else `{data_dir}/config.toml`.
pub fn default_config_path() -> PathBuf {
    match std::env::var("BRAINSTORM_CONFIG") {
        Ok(path) => PathBuf::from(path),
        Err(_) => resolve_data_dir().join("config.toml"),
    }
}

/// Load configuration from `path`.
///
/// - If the file does not exist, returns the serde defaults.
/// - If the file exists but fails to parse, returns [`ConfigError::Parse`].
///
/// The result is not validated; call [`AppConfig::validate`] before use.
pub async fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return parse_config("");
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            });
        }
    };

    parse_config(&content).inspect(|_| {
        tracing::debug!("Loaded config from {}", path.display());
    })
}

/// Parse TOML configuration text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
}

/// Look up a provider's API key in the process environment.
pub fn resolve_credential(provider: &ProviderConfig) -> Result<Option<SecretString>, ConfigError> {
    resolve_credential_with(provider, |key| std::env::var(key).ok())
}

/// Look up a provider's API key with a custom lookup function.
///
/// Providers without `api_key_env` need no credential and yield `None`.
/// A configured but unset (or blank) variable is a
/// [`ConfigError::MissingCredential`].
pub fn resolve_credential_with(
    provider: &ProviderConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Option<SecretString>, ConfigError> {
    let Some(env) = provider.api_key_env.as_deref() else {
        return Ok(None);
    };

    match lookup(env) {
        Some(value) if !value.trim().is_empty() => Ok(Some(SecretString::from(value))),
        _ => Err(ConfigError::MissingCredential {
            provider: provider.name.clone(),
            env: env.to_string(),
        }),
    }
}
