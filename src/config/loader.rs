//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{Platform, ResolverConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Variable holding the mobile build's API URL.
pub const ENV_MOBILE_API_URL: &str = "MOBILE_API_URL";
/// Variable holding the production API URL.
pub const ENV_PRODUCTION_API_URL: &str = "PRODUCTION_API_URL";
/// Variable holding the generic API base URL.
pub const ENV_GENERIC_API_BASE_URL: &str = "GENERIC_API_BASE_URL";
/// Variable overriding the last-resort origin.
pub const ENV_FALLBACK_ORIGIN: &str = "CEM_FALLBACK_ORIGIN";
/// Variable overriding the detected platform.
pub const ENV_PLATFORM: &str = "CEM_PLATFORM";
/// Variable overriding the page hostname.
pub const ENV_HOSTNAME: &str = "CEM_HOSTNAME";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid {var}: {reason}")]
    Env { var: &'static str, reason: String },

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

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ResolverConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ResolverConfig, ConfigError> {
    let config: ResolverConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load the file (or defaults), overlay process environment variables, then validate.
pub fn load_with_env(path: Option<&Path>) -> Result<ResolverConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => ResolverConfig::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Overlay environment variables onto a config.
///
/// Empty values are treated as unset.
pub fn apply_env_overrides<F>(config: &mut ResolverConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    let env = &mut config.environment;

    if let Some(url) = get(ENV_MOBILE_API_URL) {
        env.mobile_api_url = Some(url);
    }
    if let Some(url) = get(ENV_PRODUCTION_API_URL) {
        env.production_api_url = Some(url);
    }
    if let Some(url) = get(ENV_GENERIC_API_BASE_URL) {
        env.api_base_url = Some(url);
    }
    if let Some(url) = get(ENV_FALLBACK_ORIGIN) {
        env.fallback_origin = url;
    }
    if let Some(host) = get(ENV_HOSTNAME) {
        env.hostname = Some(host);
    }
    if let Some(raw) = get(ENV_PLATFORM) {
        env.platform = raw.parse::<Platform>().map_err(|reason| ConfigError::Env {
            var: ENV_PLATFORM,
            reason,
        })?;
    }
    Ok(())
}
