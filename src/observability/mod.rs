//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! probe / resolution / client produce:
//!     → logging.rs (structured log events, attempt-id spans)
//!     → metrics.rs (counters, histograms)
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Every resolution attempt carries a UUID in its span
//! - Metrics are cheap (facade no-ops without a recorder)

pub mod logging;
pub mod metrics;
