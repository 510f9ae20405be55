//! Candidate origin selection.
//!
//! Priority (earlier wins):
//! ```text
//! native:           mobile → production → generic → fallback
//! browser/sandbox:  derived sandbox backend → generic → fallback
//! browser:          generic → fallback
//! ```

use crate::config::{EnvironmentConfig, Platform, DEFAULT_FALLBACK_ORIGIN};
use crate::resolver::origin::Origin;
use crate::resolver::sandbox::sandbox_backend_origin;

/// Runtime signals sampled once per resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentSignals {
    pub platform: Platform,
    pub hostname: Option<String>,
}

impl EnvironmentSignals {
    pub fn native() -> Self {
        Self {
            platform: Platform::Native,
            hostname: None,
        }
    }

    pub fn browser(hostname: impl Into<String>) -> Self {
        Self {
            platform: Platform::Browser,
            hostname: Some(hostname.into()),
        }
    }
}

impl From<&EnvironmentConfig> for EnvironmentSignals {
    fn from(env: &EnvironmentConfig) -> Self {
        Self {
            platform: env.platform,
            hostname: env.hostname.clone(),
        }
    }
}

/// Computes candidate origins from build-time URLs and runtime signals.
#[derive(Debug, Clone)]
pub struct BaseUrlResolver {
    env: EnvironmentConfig,
}

impl BaseUrlResolver {
    pub fn new(env: EnvironmentConfig) -> Self {
        Self { env }
    }

    /// Signals as recorded in the configuration.
    pub fn configured_signals(&self) -> EnvironmentSignals {
        EnvironmentSignals::from(&self.env)
    }

    /// Ordered, de-duplicated candidates. Never empty.
    pub fn candidates(&self, signals: &EnvironmentSignals) -> Vec<Origin> {
        let env = &self.env;
        let mut out: Vec<Origin> = Vec::new();

        tracing::debug!(
            platform = %signals.platform,
            hostname = ?signals.hostname,
            "Computing API base candidates"
        );

        match signals.platform {
            Platform::Native => {
                push_configured(&mut out, "mobile_api_url", env.mobile_api_url.as_deref());
                push_configured(&mut out, "production_api_url", env.production_api_url.as_deref());
            }
            Platform::Browser => {
                let sandbox = signals
                    .hostname
                    .as_deref()
                    .and_then(|host| sandbox_backend_origin(host, env));
                if let Some(origin) = sandbox {
                    tracing::debug!(origin = %origin, "Cloud sandbox detected");
                    push_unique(&mut out, origin);
                }
            }
        }

        push_configured(&mut out, "api_base_url", env.api_base_url.as_deref());
        push_unique(&mut out, self.fallback());

        out
    }

    /// Highest-priority candidate.
    pub fn primary(&self, signals: &EnvironmentSignals) -> Origin {
        self.candidates(signals)
            .into_iter()
            .next()
            .unwrap_or_else(|| self.fallback())
    }

    fn fallback(&self) -> Origin {
        Origin::parse(&self.env.fallback_origin).unwrap_or_else(|e| {
            tracing::warn!(
                fallback = %self.env.fallback_origin,
                error = %e,
                "Configured fallback origin is invalid, using built-in default"
            );
            builtin_fallback()
        })
    }
}

fn builtin_fallback() -> Origin {
    Origin::parse(DEFAULT_FALLBACK_ORIGIN).expect("built-in fallback origin is valid")
}

fn push_configured(out: &mut Vec<Origin>, source: &'static str, value: Option<&str>) {
    let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
        return;
    };
    match Origin::parse(value) {
        Ok(origin) => push_unique(out, origin),
        Err(e) => tracing::warn!(source, value, error = %e, "Skipping invalid configured API URL"),
    }
}

fn push_unique(out: &mut Vec<Origin>, origin: Origin) {
    if !out.contains(&origin) {
        out.push(origin);
    }
}
