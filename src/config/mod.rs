//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, overlay env vars)
//!     → validation.rs (semantic checks)
//!     → ResolverConfig (validated, immutable)
//!     → handed to ApiBaseResolver
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → ApiBaseResolver::reload swaps config and drops the cached origin
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Build-time URLs come from environment variables, file values are the base

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, load_with_env, ConfigError};
pub use schema::{
    ClientConfig, EnvironmentConfig, LogFormat, ObservabilityConfig, Platform, ProbeConfig,
    ResolverConfig, DEFAULT_FALLBACK_ORIGIN,
};
pub use validation::ValidationError;
