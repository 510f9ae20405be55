//! Reachability probing subsystem.
//!
//! # Data Flow
//! ```text
//! Origin candidate
//!     → prober.rs (health paths in order, per-probe deadline)
//!     → transport.rs (GET via reqwest)
//!     → ProbeResult per attempt
//! ```
//!
//! # Design Decisions
//! - Transport is a trait so resolution logic is testable without sockets
//! - Probes never run in parallel; order is the priority

pub mod prober;
pub mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use prober::{OriginReport, ProbeOutcome, ProbeResult, Prober};
pub use transport::{HttpTransport, ProbeResponse, ProbeTransport, TransportError};
