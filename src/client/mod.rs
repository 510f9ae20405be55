//! API client subsystem.
//!
//! Every request resolves the base first (usually a cache hit). A request
//! that gets no response invalidates the cached origin so the next call
//! re-probes instead of hammering a dead backend.

pub mod api;

pub use api::{ApiClient, ApiError, LoginResponse, LoginUser};
