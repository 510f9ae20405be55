//! End-to-end API base resolution.
//!
//! # Data Flow
//! ```text
//! resolve()
//!     → cache hit? return it
//!     → join the in-flight sequence, or start one:
//!         resolver::BaseUrlResolver (ordered candidates)
//!         → for each candidate, then its HTTPS variant:
//!             probe::Prober (health paths, per-probe deadline)
//!         → first success: cache::ResolutionCache::set
//!         → exhaustion: ResolveError::Unreachable (cache untouched)
//! ```

pub mod error;
pub mod service;

pub use error::{ResolutionState, ResolveError};
pub use service::ApiBaseResolver;
