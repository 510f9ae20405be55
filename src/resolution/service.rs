//! API base resolution service.
//!
//! # Responsibilities
//! - Answer from the cache when a confirmed origin exists
//! - Otherwise probe candidates (and their HTTPS variants) in priority order
//! - Share one in-flight probe sequence between concurrent callers
//!
//! # Design Decisions
//! - State lives in the resolver instance; tests build isolated resolvers
//! - Only successes are cached, so an exhausted attempt never sticks
//! - Reload swaps in a fresh cache; a sequence started under the old
//!   config can only write to the cache it started with

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use arc_swap::ArcSwap;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use tracing::Instrument;
use uuid::Uuid;

use crate::cache::ResolutionCache;
use crate::config::ResolverConfig;
use crate::observability::metrics;
use crate::probe::{HttpTransport, ProbeTransport, Prober, TransportError};
use crate::resolution::error::{ResolutionState, ResolveError};
use crate::resolver::{BaseUrlResolver, Origin};

type SharedResolution = Shared<BoxFuture<'static, Result<Origin, ResolveError>>>;

struct Inner {
    config: ArcSwap<ResolverConfig>,
    transport: Arc<dyn ProbeTransport>,
    cache: ArcSwap<ResolutionCache>,
    in_flight: Mutex<Option<(u64, SharedResolution)>>,
    next_id: AtomicU64,
}

/// Resolves and remembers the API origin the client should talk to.
///
/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct ApiBaseResolver {
    inner: Arc<Inner>,
}

impl ApiBaseResolver {
    /// Resolver probing over HTTP with `reqwest`.
    pub fn new(config: ResolverConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(&config.probe.user_agent)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: ResolverConfig, transport: Arc<dyn ProbeTransport>) -> Self {
        let cache = new_cache(&config);
        Self {
            inner: Arc::new(Inner {
                config: ArcSwap::from_pointee(config),
                transport,
                cache: ArcSwap::from_pointee(cache),
                in_flight: Mutex::new(None),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    pub fn config(&self) -> Arc<ResolverConfig> {
        self.inner.config.load_full()
    }

    /// Candidates the next probe sequence would try, in order.
    pub fn candidates(&self) -> Vec<Origin> {
        let config = self.inner.config.load();
        let resolver = BaseUrlResolver::new(config.environment.clone());
        resolver.candidates(&resolver.configured_signals())
    }

    /// Prober built from the current configuration.
    pub fn prober(&self) -> Prober {
        Prober::new(self.inner.transport.clone(), &self.inner.config.load().probe)
    }

    pub fn cached(&self) -> Option<Origin> {
        self.inner.cache.load().get()
    }

    pub fn state(&self) -> ResolutionState {
        match self.cached() {
            Some(origin) => ResolutionState::Resolved(origin),
            None => ResolutionState::Unresolved,
        }
    }

    /// Forget the confirmed origin so the next `resolve` probes again.
    pub fn invalidate(&self) -> Option<Origin> {
        let previous = self.inner.cache.load().clear();
        if let Some(origin) = &previous {
            tracing::info!(origin = %origin, "API base cache invalidated");
        }
        previous
    }

    /// Swap in a new configuration and drop the cached origin.
    pub fn reload(&self, config: ResolverConfig) {
        let cache = new_cache(&config);
        self.inner.config.store(Arc::new(config));
        self.inner.cache.store(Arc::new(cache));
        self.lock_in_flight().take();
        tracing::info!("Resolver configuration reloaded");
    }

    /// Invalidate, then resolve from scratch.
    pub async fn refresh(&self) -> Result<Origin, ResolveError> {
        self.invalidate();
        self.resolve().await
    }

    /// Confirmed-reachable origin, probing only if none is cached.
    pub async fn resolve(&self) -> Result<Origin, ResolveError> {
        if let Some(origin) = self.cached() {
            metrics::record_cache_hit();
            tracing::debug!(origin = %origin, "Using cached API base");
            return Ok(origin);
        }

        let (id, resolution) = self.join_or_start();
        let result = resolution.await;

        let mut slot = self.lock_in_flight();
        if slot.as_ref().map_or(false, |(current, _)| *current == id) {
            slot.take();
        }
        result
    }

    fn join_or_start(&self) -> (u64, SharedResolution) {
        let mut slot = self.lock_in_flight();
        if let Some((id, resolution)) = slot.as_ref() {
            tracing::debug!(resolution_id = id, "Joining in-flight resolution");
            return (*id, resolution.clone());
        }

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let inner = Arc::clone(&self.inner);
        let resolution = async move { inner.probe_sequence().await.into_result() }
            .boxed()
            .shared();
        *slot = Some((id, resolution.clone()));
        (id, resolution)
    }

    fn lock_in_flight(&self) -> std::sync::MutexGuard<'_, Option<(u64, SharedResolution)>> {
        self.inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Inner {
    async fn probe_sequence(&self) -> Outcome {
        let attempt_id = Uuid::new_v4();
        let span = tracing::info_span!("resolve", %attempt_id);
        self.probe_sequence_inner().instrument(span).await
    }

    async fn probe_sequence_inner(&self) -> Outcome {
        let cache = self.cache.load_full();
        if let Some(origin) = cache.get() {
            return Outcome::resolved(origin);
        }

        let config = self.config.load_full();
        let resolver = BaseUrlResolver::new(config.environment.clone());
        let candidates = resolver.candidates(&resolver.configured_signals());
        let prober = Prober::new(self.transport.clone(), &config.probe);

        tracing::info!(
            candidates = ?candidates.iter().map(Origin::as_str).collect::<Vec<_>>(),
            "Resolving API base"
        );

        let mut tried: Vec<Origin> = Vec::new();
        let mut attempts = 0;

        for candidate in &candidates {
            let mut variants = vec![candidate.clone()];
            if config.probe.https_fallback {
                variants.extend(candidate.https_variant());
            }

            for origin in variants {
                if tried.contains(&origin) {
                    continue;
                }
                tried.push(origin.clone());

                let report = prober.probe_origin(&origin).await;
                attempts += report.attempts.len();

                if report.reachable() {
                    cache.set(origin.clone());
                    metrics::record_resolution("resolved");
                    tracing::info!(origin = %origin, attempts, "API base resolved");
                    return Outcome::resolved(origin);
                }
                tracing::warn!(origin = %origin, "Origin unreachable on every health path");
            }
        }

        metrics::record_resolution("unreachable");
        let origins: Vec<String> = tried.iter().map(Origin::to_string).collect();
        tracing::error!(?origins, attempts, "Backend unreachable");
        Outcome {
            state: ResolutionState::Failed(format!("{} origins exhausted", origins.len())),
            origins,
            attempts,
        }
    }
}

struct Outcome {
    state: ResolutionState,
    origins: Vec<String>,
    attempts: usize,
}

impl Outcome {
    fn resolved(origin: Origin) -> Self {
        Self {
            state: ResolutionState::Resolved(origin),
            origins: Vec::new(),
            attempts: 0,
        }
    }

    fn into_result(self) -> Result<Origin, ResolveError> {
        match self.state {
            ResolutionState::Resolved(origin) => Ok(origin),
            ResolutionState::Failed(_) | ResolutionState::Unresolved => {
                Err(ResolveError::Unreachable {
                    origins: self.origins,
                    attempts: self.attempts,
                })
            }
        }
    }
}

fn new_cache(config: &ResolverConfig) -> ResolutionCache {
    ResolutionCache::new(config.probe.revalidate_after_secs.map(Duration::from_secs))
}

impl std::fmt::Debug for ApiBaseResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiBaseResolver")
            .field("cached", &self.cached())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Platform;
    use crate::probe::mock::{MockTransport, Reply};
    use futures_util::future::join_all;
    use tokio::time::Instant;

    fn native_config() -> ResolverConfig {
        let mut config = ResolverConfig::default();
        config.environment.platform = Platform::Native;
        config.environment.mobile_api_url = Some("http://mobile.test:8000".into());
        config.environment.production_api_url = Some("https://prod.test".into());
        config
    }

    fn resolver(config: ResolverConfig, transport: &Arc<MockTransport>) -> ApiBaseResolver {
        ApiBaseResolver::with_transport(config, transport.clone())
    }

    #[tokio::test]
    async fn test_second_resolve_uses_cache() {
        let transport = Arc::new(
            MockTransport::new().route("http://mobile.test:8000/api/health", Reply::Status(200)),
        );
        let resolver = resolver(native_config(), &transport);
        assert_eq!(resolver.state(), ResolutionState::Unresolved);

        let first = resolver.resolve().await.unwrap();
        assert_eq!(first.as_str(), "http://mobile.test:8000");
        assert_eq!(transport.call_count(), 1);

        let second = resolver.resolve().await.unwrap();
        assert_eq!(second, first);
        assert_eq!(transport.call_count(), 1);
        assert_eq!(resolver.state(), ResolutionState::Resolved(first));
    }

    #[tokio::test(start_paused = true)]
    async fn test_https_variant_after_http_fails() {
        let transport = Arc::new(
            MockTransport::new()
                .route("http://mobile.test:8000/api/health", Reply::Status(500))
                .route("http://mobile.test:8000/health", Reply::Hang)
                .route("http://mobile.test:8000/api", Reply::Status(503))
                .route("https://mobile.test:8000/api/health", Reply::Status(200)),
        );
        let resolver = resolver(native_config(), &transport);

        let origin = resolver.resolve().await.unwrap();
        assert_eq!(origin.as_str(), "https://mobile.test:8000");
        assert_eq!(
            transport.calls(),
            vec![
                "http://mobile.test:8000/api/health",
                "http://mobile.test:8000/health",
                "http://mobile.test:8000/api",
                "https://mobile.test:8000/api/health",
            ]
        );
    }

    #[tokio::test]
    async fn test_later_candidate_used_when_earlier_unreachable() {
        let transport = Arc::new(
            MockTransport::new().route("https://prod.test/health", Reply::Status(200)),
        );
        let resolver = resolver(native_config(), &transport);

        let origin = resolver.resolve().await.unwrap();
        assert_eq!(origin.as_str(), "https://prod.test");
        // 3 paths on http + 3 on https for mobile, then two on prod.
        assert_eq!(transport.call_count(), 8);
    }

    #[tokio::test]
    async fn test_https_fallback_disabled() {
        let transport = Arc::new(
            MockTransport::new().route("https://mobile.test:8000/api/health", Reply::Status(200)),
        );
        let mut config = native_config();
        config.probe.https_fallback = false;
        config.environment.production_api_url = None;
        let resolver = resolver(config, &transport);

        let err = resolver.resolve().await.unwrap_err();
        assert!(transport
            .calls()
            .iter()
            .all(|url| !url.starts_with("https://mobile.test")));
        let ResolveError::Unreachable { origins, .. } = err;
        assert_eq!(origins, vec!["http://mobile.test:8000", "http://localhost:8000"]);
    }

    #[tokio::test]
    async fn test_total_failure_is_not_cached() {
        let transport = Arc::new(MockTransport::new());
        let resolver = resolver(ResolverConfig::default(), &transport);

        let err = resolver.resolve().await.unwrap_err();
        assert_eq!(
            err,
            ResolveError::Unreachable {
                origins: vec!["http://localhost:8000".into(), "https://localhost:8000".into()],
                attempts: 6,
            }
        );
        assert!(err.to_string().contains("backend unreachable"));
        assert_eq!(resolver.state(), ResolutionState::Unresolved);
        assert_eq!(transport.call_count(), 6);

        transport.set("http://localhost:8000/api", Reply::Status(200));
        let origin = resolver.resolve().await.unwrap();
        assert_eq!(origin.as_str(), "http://localhost:8000");
        assert_eq!(transport.call_count(), 9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unresponsive_backend_bounded_by_probe_timeouts() {
        let transport = Arc::new(
            MockTransport::new()
                .route("http://localhost:8000/api/health", Reply::Hang)
                .route("http://localhost:8000/health", Reply::Hang)
                .route("http://localhost:8000/api", Reply::Hang)
                .route("https://localhost:8000/api/health", Reply::Hang)
                .route("https://localhost:8000/health", Reply::Hang)
                .route("https://localhost:8000/api", Reply::Hang),
        );
        let resolver = resolver(ResolverConfig::default(), &transport);

        let started = Instant::now();
        assert!(resolver.resolve().await.is_err());
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(18_000));
        assert!(elapsed < Duration::from_millis(18_100));
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_probe_sequence() {
        let transport = Arc::new(
            MockTransport::new()
                .with_delay(Duration::from_millis(50))
                .route("http://mobile.test:8000/api/health", Reply::Status(200)),
        );
        let resolver = resolver(native_config(), &transport);

        let results = join_all((0..8).map(|_| {
            let resolver = resolver.clone();
            async move { resolver.resolve().await }
        }))
        .await;

        assert!(results
            .iter()
            .all(|r| r.as_ref().unwrap().as_str() == "http://mobile.test:8000"));
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_failure() {
        let transport = Arc::new(MockTransport::new().with_delay(Duration::from_millis(10)));
        let resolver = resolver(ResolverConfig::default(), &transport);

        let (a, b) = tokio::join!(resolver.resolve(), resolver.resolve());
        assert_eq!(a.unwrap_err(), b.unwrap_err());
        assert_eq!(transport.call_count(), 6);
    }

    #[tokio::test]
    async fn test_invalidate_forces_new_probe() {
        let transport = Arc::new(
            MockTransport::new().route("http://mobile.test:8000/api/health", Reply::Status(200)),
        );
        let resolver = resolver(native_config(), &transport);
        resolver.resolve().await.unwrap();

        let previous = resolver.invalidate().unwrap();
        assert_eq!(previous.as_str(), "http://mobile.test:8000");
        assert!(resolver.invalidate().is_none());

        resolver.resolve().await.unwrap();
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_reload_switches_candidates() {
        let transport = Arc::new(
            MockTransport::new()
                .route("http://mobile.test:8000/api/health", Reply::Status(200))
                .route("http://moved.test:9000/api/health", Reply::Status(200)),
        );
        let resolver = resolver(native_config(), &transport);
        resolver.resolve().await.unwrap();

        let mut config = native_config();
        config.environment.mobile_api_url = Some("http://moved.test:9000".into());
        resolver.reload(config);
        assert_eq!(resolver.state(), ResolutionState::Unresolved);

        let origin = resolver.resolve().await.unwrap();
        assert_eq!(origin.as_str(), "http://moved.test:9000");
        assert_eq!(resolver.candidates()[0], origin);
    }

    #[tokio::test(start_paused = true)]
    async fn test_revalidation_after_max_age() {
        let transport = Arc::new(
            MockTransport::new().route("http://mobile.test:8000/api/health", Reply::Status(200)),
        );
        let mut config = native_config();
        config.probe.revalidate_after_secs = Some(300);
        let resolver = resolver(config, &transport);

        resolver.resolve().await.unwrap();
        tokio::time::advance(Duration::from_secs(299)).await;
        resolver.resolve().await.unwrap();
        assert_eq!(transport.call_count(), 1);

        tokio::time::advance(Duration::from_secs(1)).await;
        resolver.resolve().await.unwrap();
        assert_eq!(transport.call_count(), 2);
    }
}
