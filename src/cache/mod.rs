//! Resolution cache.
//!
//! # Design Decisions
//! - One slot, not a list: the last confirmed origin wins
//! - Owned by a resolver instance, never process-global
//! - Failures are never cached

pub mod slot;

pub use slot::ResolutionCache;
