//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check every configured URL parses as an HTTP(S) origin
//! - Validate value ranges (timeouts > 0, ports distinct)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ResolverConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::ResolverConfig;
use crate::resolver::Origin;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a valid HTTP(S) origin")]
    InvalidOrigin { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("probe.health_paths must not be empty")]
    NoHealthPaths,

    #[error("probe.health_paths: '{0}' must start with '/'")]
    RelativePath(String),

    #[error("client.api_prefix: '{0}' must be empty or start with '/'")]
    InvalidPrefix(String),

    #[error("environment: sandbox front-end and backend ports are both {0}")]
    SamePorts(u16),

    #[error("observability.log_level: unknown level '{0}'")]
    UnknownLogLevel(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ResolverConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let env = &config.environment;

    let urls = [
        ("environment.mobile_api_url", env.mobile_api_url.as_deref()),
        ("environment.production_api_url", env.production_api_url.as_deref()),
        ("environment.api_base_url", env.api_base_url.as_deref()),
        ("environment.fallback_origin", Some(env.fallback_origin.as_str())),
    ];
    for (field, value) in urls {
        if let Some(value) = value {
            if Origin::parse(value).is_err() {
                errors.push(ValidationError::InvalidOrigin {
                    field,
                    value: value.to_string(),
                });
            }
        }
    }

    if env.sandbox_frontend_port == env.sandbox_backend_port {
        errors.push(ValidationError::SamePorts(env.sandbox_frontend_port));
    }

    let probe = &config.probe;
    if probe.timeout_ms == 0 {
        errors.push(ValidationError::Zero { field: "probe.timeout_ms" });
    }
    if probe.revalidate_after_secs == Some(0) {
        errors.push(ValidationError::Zero {
            field: "probe.revalidate_after_secs",
        });
    }
    if probe.health_paths.is_empty() {
        errors.push(ValidationError::NoHealthPaths);
    }
    for path in &probe.health_paths {
        if !path.starts_with('/') {
            errors.push(ValidationError::RelativePath(path.clone()));
        }
    }

    let client = &config.client;
    if !client.api_prefix.is_empty() && !client.api_prefix.starts_with('/') {
        errors.push(ValidationError::InvalidPrefix(client.api_prefix.clone()));
    }
    if client.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "client.request_timeout_secs",
        });
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
