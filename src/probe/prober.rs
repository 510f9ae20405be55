//! Bounded-time reachability probes.
//!
//! # Responsibilities
//! - Probe an origin's health paths strictly in order
//! - Enforce the per-probe deadline (dropping the request future cancels it)
//! - Record one `ProbeResult` per attempt
//!
//! # Design Decisions
//! - Timeouts are indistinguishable from network errors to callers
//! - First 2xx short-circuits the remaining paths
//! - Body is only read when an expected payload is configured

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::{timeout, Instant};

use crate::config::ProbeConfig;
use crate::observability::metrics;
use crate::probe::transport::ProbeTransport;
use crate::resolver::Origin;

/// How a single probe ended; also the `outcome` metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeOutcome {
    Ok,
    /// Answered with a non-2xx status.
    Status,
    /// 2xx without the expected payload.
    Body,
    Error,
    Timeout,
}

impl ProbeOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            ProbeOutcome::Ok => "ok",
            ProbeOutcome::Status => "status",
            ProbeOutcome::Body => "body",
            ProbeOutcome::Error => "error",
            ProbeOutcome::Timeout => "timeout",
        }
    }
}

/// Outcome of a single probe.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub candidate: Origin,
    pub path: String,
    pub ok: bool,
    pub outcome: ProbeOutcome,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// All attempts made against one origin.
#[derive(Debug, Clone, Serialize)]
pub struct OriginReport {
    pub origin: Origin,
    pub attempts: Vec<ProbeResult>,
}

impl OriginReport {
    pub fn reachable(&self) -> bool {
        self.attempts.last().map_or(false, |r| r.ok)
    }
}

/// Runs health-check probes against candidate origins.
#[derive(Clone)]
pub struct Prober {
    transport: Arc<dyn ProbeTransport>,
    timeout: Duration,
    paths: Vec<String>,
    expect_body: Option<String>,
}

impl Prober {
    pub fn new(transport: Arc<dyn ProbeTransport>, config: &ProbeConfig) -> Self {
        Self {
            transport,
            timeout: Duration::from_millis(config.timeout_ms),
            paths: config.health_paths.clone(),
            expect_body: config.expect_body.clone(),
        }
    }

    /// Probe every health path on `origin` until one succeeds.
    pub async fn probe_origin(&self, origin: &Origin) -> OriginReport {
        let mut attempts = Vec::with_capacity(self.paths.len());
        for path in &self.paths {
            let result = self.probe_path(origin, path).await;
            let ok = result.ok;
            attempts.push(result);
            if ok {
                break;
            }
        }
        OriginReport {
            origin: origin.clone(),
            attempts,
        }
    }

    /// Single GET of `origin` + `path` under the probe deadline.
    pub async fn probe_path(&self, origin: &Origin, path: &str) -> ProbeResult {
        let started = Instant::now();
        let mut result = ProbeResult {
            candidate: origin.clone(),
            path: path.to_string(),
            ok: false,
            outcome: ProbeOutcome::Error,
            latency_ms: 0,
            status: None,
            error: None,
        };

        let url = match origin.join(path) {
            Ok(url) => url,
            Err(e) => {
                result.error = Some(e.to_string());
                tracing::warn!(origin = %origin, path, error = %e, "Probe URL invalid");
                return result;
            }
        };

        let read_body = self.expect_body.is_some();
        let outcome = match timeout(self.timeout, self.transport.get(&url, read_body)).await {
            Ok(Ok(response)) => {
                result.status = Some(response.status);
                if !response.is_success() {
                    result.error = Some(format!("non-success status {}", response.status));
                    ProbeOutcome::Status
                } else if let Some(expected) = &self.expect_body {
                    let body = response.body.unwrap_or_default();
                    if body.contains(expected.as_str()) {
                        result.ok = true;
                        ProbeOutcome::Ok
                    } else {
                        result.error = Some(format!("response body lacks '{}'", expected));
                        ProbeOutcome::Body
                    }
                } else {
                    result.ok = true;
                    ProbeOutcome::Ok
                }
            }
            Ok(Err(e)) => {
                result.error = Some(e.to_string());
                ProbeOutcome::Error
            }
            Err(_) => {
                result.error = Some(format!("timed out after {} ms", self.timeout.as_millis()));
                ProbeOutcome::Timeout
            }
        };

        let latency = started.elapsed();
        result.outcome = outcome;
        result.latency_ms = latency.as_millis() as u64;
        metrics::record_probe(outcome, latency);

        if result.ok {
            tracing::info!(url = %url, status = ?result.status, latency_ms = result.latency_ms, "Probe succeeded");
        } else {
            tracing::warn!(
                url = %url,
                outcome = outcome.as_str(),
                error = result.error.as_deref().unwrap_or_default(),
                latency_ms = result.latency_ms,
                "Probe failed"
            );
        }

        result
    }
}

impl std::fmt::Debug for Prober {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prober")
            .field("timeout", &self.timeout)
            .field("paths", &self.paths)
            .field("expect_body", &self.expect_body)
            .finish()
    }
}
