//! Resolution outcomes and errors.

use thiserror::Error;

use crate::resolver::Origin;

/// Where a resolver currently stands.
///
/// `Failed` only describes the end of an exhausted attempt; a resolver
/// reports `Unresolved` again afterwards so the next call retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionState {
    Unresolved,
    Resolved(Origin),
    Failed(String),
}

/// Errors returned by `ApiBaseResolver::resolve`.
///
/// Cloneable so every caller awaiting a shared resolution receives it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("backend unreachable: {attempts} probes failed across [{}]", .origins.join(", "))]
    Unreachable { origins: Vec<String>, attempts: usize },
}
