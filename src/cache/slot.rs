//! Single-slot cache for the confirmed origin.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use tokio::time::Instant;

use crate::resolver::Origin;

#[derive(Debug)]
struct Entry {
    origin: Origin,
    confirmed_at: Instant,
}

/// Holds at most one confirmed-reachable origin.
///
/// Reads are lock-free. Entries optionally age out after `max_age`.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    slot: ArcSwapOption<Entry>,
    max_age: Option<Duration>,
}

impl ResolutionCache {
    pub fn new(max_age: Option<Duration>) -> Self {
        Self {
            slot: ArcSwapOption::empty(),
            max_age,
        }
    }

    /// The cached origin, unless empty or expired.
    pub fn get(&self) -> Option<Origin> {
        let guard = self.slot.load();
        let entry = guard.as_ref()?;
        if let Some(max_age) = self.max_age {
            if entry.confirmed_at.elapsed() >= max_age {
                tracing::debug!(origin = %entry.origin, "Cached origin expired");
                return None;
            }
        }
        Some(entry.origin.clone())
    }

    pub fn set(&self, origin: Origin) {
        self.slot.store(Some(Arc::new(Entry {
            origin,
            confirmed_at: Instant::now(),
        })));
    }

    /// Empty the slot, returning what was there.
    pub fn clear(&self) -> Option<Origin> {
        self.slot.swap(None).map(|entry| entry.origin.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.get().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin(s: &str) -> Origin {
        Origin::parse(s).unwrap()
    }

    #[test]
    fn test_single_slot_last_write_wins() {
        let cache = ResolutionCache::new(None);
        assert!(cache.is_empty());

        cache.set(origin("http://a.test:8000"));
        cache.set(origin("https://b.test"));
        assert_eq!(cache.get().unwrap().as_str(), "https://b.test");

        assert_eq!(cache.clear().unwrap().as_str(), "https://b.test");
        assert!(cache.get().is_none());
        assert!(cache.clear().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_max_age() {
        let cache = ResolutionCache::new(Some(Duration::from_secs(60)));
        cache.set(origin("http://a.test:8000"));

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(cache.get().is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get().is_none());
    }
}
