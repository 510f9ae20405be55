//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the resolver.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Last-resort origin used when nothing else is configured.
pub const DEFAULT_FALLBACK_ORIGIN: &str = "http://localhost:8000";

/// Root configuration for API base resolution.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ResolverConfig {
    /// Build-time URLs and runtime platform signals.
    pub environment: EnvironmentConfig,

    /// Reachability probe settings.
    pub probe: ProbeConfig,

    /// API client settings.
    pub client: ClientConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Runtime platform the client is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Wrapped native mobile app.
    Native,
    /// Plain browser page.
    #[default]
    Browser,
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" | "mobile" => Ok(Platform::Native),
            "browser" | "web" => Ok(Platform::Browser),
            other => Err(format!("unknown platform '{}'", other)),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Native => f.write_str("native"),
            Platform::Browser => f.write_str("browser"),
        }
    }
}

/// Build-time URLs and platform detection inputs.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Detected platform.
    pub platform: Platform,

    /// Hostname of the page serving the front-end (browser only).
    pub hostname: Option<String>,

    /// API URL baked into mobile builds (`MOBILE_API_URL`).
    pub mobile_api_url: Option<String>,

    /// Production API URL (`PRODUCTION_API_URL`).
    pub production_api_url: Option<String>,

    /// Generic API base URL (`GENERIC_API_BASE_URL`).
    pub api_base_url: Option<String>,

    /// Origin tried when nothing else is set.
    pub fallback_origin: String,

    /// Hostname suffix identifying a cloud dev sandbox.
    pub sandbox_domain_suffix: String,

    /// Port embedded in the sandbox hostname for the front-end.
    pub sandbox_frontend_port: u16,

    /// Port embedded in the sandbox hostname for the backend.
    pub sandbox_backend_port: u16,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            platform: Platform::Browser,
            hostname: None,
            mobile_api_url: None,
            production_api_url: None,
            api_base_url: None,
            fallback_origin: DEFAULT_FALLBACK_ORIGIN.to_string(),
            sandbox_domain_suffix: ".app.github.dev".to_string(),
            sandbox_frontend_port: 5173,
            sandbox_backend_port: 8000,
        }
    }
}

/// Reachability probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ProbeConfig {
    /// Per-probe timeout in milliseconds.
    pub timeout_ms: u64,

    /// Health-check paths, tried in order.
    pub health_paths: Vec<String>,

    /// Retry an HTTP candidate over HTTPS when every path failed.
    pub https_fallback: bool,

    /// If set, a 2xx response must also contain this text.
    pub expect_body: Option<String>,

    /// Re-probe once the cached origin is older than this. `None` keeps it forever.
    pub revalidate_after_secs: Option<u64>,

    /// User agent sent with probes.
    pub user_agent: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 3000,
            health_paths: vec![
                "/api/health".to_string(),
                "/health".to_string(),
                "/api".to_string(),
            ],
            https_fallback: true,
            expect_body: None,
            revalidate_after_secs: None,
            user_agent: "cem-resolver-probe".to_string(),
        }
    }
}

/// API client configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Path prefix appended to the resolved origin.
    pub api_prefix: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_prefix: "/api".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON lines.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
