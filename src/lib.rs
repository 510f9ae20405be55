//! API base resolution for the Chiefdom Empowerment Model client.
//!
//! Turns build-time URLs and runtime platform signals into a confirmed-reachable
//! API origin, then serves JSON requests against it.

pub mod cache;
pub mod client;
pub mod config;
pub mod observability;
pub mod probe;
pub mod resolution;
pub mod resolver;

pub use client::{ApiClient, ApiError};
pub use config::ResolverConfig;
pub use resolution::{ApiBaseResolver, ResolutionState, ResolveError};
pub use resolver::{BaseUrlResolver, EnvironmentSignals, Origin};
