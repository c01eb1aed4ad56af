//! Configuration loading from disk.

use std::path::Path;

use tokio::fs;

use crate::config::schema::HookConfig;
use crate::config::validation::{retain_valid, validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn deserialize(path: &Path, content: &str) -> Result<HookConfig, ConfigError> {
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        Ok(toml::from_str(content)?)
    } else {
        Ok(serde_json::from_str(content)?)
    }
}

/// Parse configuration text. `.toml` paths are TOML, everything else JSON.
pub fn parse_config(path: &Path, content: &str) -> Result<HookConfig, ConfigError> {
    let config = deserialize(path, content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse configuration text, dropping invalid route entries instead of
/// failing. Only syntax errors are fatal.
pub fn parse_routes(
    path: &Path,
    content: &str,
) -> Result<(HookConfig, Vec<ValidationError>), ConfigError> {
    let mut config = deserialize(path, content)?;
    let skipped = retain_valid(&mut config);
    Ok((config, skipped))
}

/// Load and validate configuration from a JSON or TOML file.
pub async fn load_config(path: &Path) -> Result<HookConfig, ConfigError> {
    let content = fs::read_to_string(path).await?;
    parse_config(path, &content)
}

/// Load the routing file for one request; see [`parse_routes`].
pub async fn load_routes(path: &Path) -> Result<(HookConfig, Vec<ValidationError>), ConfigError> {
    let content = fs::read_to_string(path).await?;
    parse_routes(path, &content)
}
