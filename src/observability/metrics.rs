//! Metrics collection.
//!
//! # Metrics
//! - `resolver_probes_total` (counter): probes by outcome (ok, status, body, error, timeout)
//! - `resolver_probe_duration_seconds` (histogram): per-probe latency
//! - `resolver_resolutions_total` (counter): resolution attempts by outcome
//! - `resolver_cache_hits_total` (counter): resolves answered from the cache
//!
//! Recording goes through the `metrics` facade; without an installed
//! recorder every call is a no-op.

use std::time::Duration;

use crate::probe::ProbeOutcome;

/// Record one probe attempt.
pub fn record_probe(outcome: ProbeOutcome, latency: Duration) {
    metrics::counter!("resolver_probes_total", "outcome" => outcome.as_str()).increment(1);
    metrics::histogram!("resolver_probe_duration_seconds").record(latency.as_secs_f64());
}

/// Record the end of a probe sequence.
pub fn record_resolution(outcome: &'static str) {
    metrics::counter!("resolver_resolutions_total", "outcome" => outcome).increment(1);
}

/// Record a resolve served from the cache.
pub fn record_cache_hit() {
    metrics::counter!("resolver_cache_hits_total").increment(1);
}
