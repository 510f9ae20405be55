//! Base URL resolution.
//!
//! # Data Flow
//! ```text
//! EnvironmentConfig (build-time URLs, fallback)
//!     + EnvironmentSignals (platform, page hostname)
//!     → candidates.rs (ordered list, sandbox rewrite via sandbox.rs)
//!     → Vec<Origin> handed to the prober
//! ```
//!
//! # Design Decisions
//! - Pure: no I/O, only diagnostic logging
//! - Never fails; the fallback origin always terminates the list
//! - Invalid configured URLs are skipped, not fatal

pub mod candidates;
pub mod origin;
pub mod sandbox;

pub use candidates::{BaseUrlResolver, EnvironmentSignals};
pub use origin::{Origin, OriginError};
