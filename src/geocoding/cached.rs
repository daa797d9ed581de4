//! Persistent cache in front of any [`Geocoder`]

use async_trait::async_trait;
use rand::RngExt;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{GeocodeOutcome, Geocoder};
use crate::cache::PersistentCache;
use crate::models::GeocodeResult;

/// Remembers successful lookups; misses and service errors always reach the inner geocoder
pub struct CachedGeocoder<G> {
    inner: G,
    cache: PersistentCache,
    ttl_hours: u32,
}

fn cache_key(name: &str) -> String {
    format!("geocode:{}", name.trim().to_lowercase())
}

impl<G: Geocoder> CachedGeocoder<G> {
    #[must_use]
    pub fn new(inner: G, cache: PersistentCache, ttl_hours: u32) -> Self {
        Self {
            inner,
            cache,
            ttl_hours,
        }
    }

    fn jittered_ttl(&self) -> Duration {
        let jitter: f32 = rand::rng().random_range(0.9..1.1);
        Duration::from_hours((self.ttl_hours as f32 * jitter) as u64)
    }
}

#[async_trait]
impl<G: Geocoder> Geocoder for CachedGeocoder<G> {
    #[instrument(skip(self), fields(location = name))]
    async fn resolve(&self, name: &str) -> GeocodeOutcome {
        let key = cache_key(name);

        match self.cache.get::<GeocodeResult>(&key).await {
            Ok(Some(cached)) => {
                debug!("Geocode cache hit");
                return GeocodeOutcome::Found(cached);
            }
            Ok(None) => {}
            Err(e) => warn!("Geocode cache read failed: {}", e),
        }

        let outcome = self.inner.resolve(name).await;
        if let GeocodeOutcome::Found(result) = &outcome {
            if let Err(e) = self.cache.put(&key, result.clone(), self.jittered_ttl()).await {
                warn!("Geocode cache write failed: {}", e);
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocoding::GeocodeError;
    use crate::test_support::temp_storage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
        outcome: GeocodeOutcome,
    }

    #[async_trait]
    impl Geocoder for Counting {
        async fn resolve(&self, _name: &str) -> GeocodeOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    fn counting(outcome: GeocodeOutcome) -> Counting {
        Counting {
            calls: AtomicUsize::new(0),
            outcome,
        }
    }

    fn tower() -> GeocodeResult {
        GeocodeResult {
            latitude: 48.8584,
            longitude: 2.2945,
            display_address: "Eiffel Tower, Paris".to_string(),
        }
    }

    #[tokio::test]
    async fn test_found_is_cached_case_insensitively() {
        let storage = temp_storage();
        let geocoder = CachedGeocoder::new(
            counting(GeocodeOutcome::Found(tower())),
            storage.cache(),
            168,
        );

        assert_eq!(geocoder.resolve("Eiffel Tower").await, GeocodeOutcome::Found(tower()));
        assert_eq!(geocoder.resolve("  eiffel tower ").await, GeocodeOutcome::Found(tower()));
        assert_eq!(geocoder.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_not_found_is_not_cached() {
        let storage = temp_storage();
        let geocoder = CachedGeocoder::new(
            counting(GeocodeOutcome::NotFound),
            storage.cache(),
            168,
        );

        geocoder.resolve("Atlantis").await;
        geocoder.resolve("Atlantis").await;
        assert_eq!(geocoder.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_service_error_is_not_cached() {
        let storage = temp_storage();
        let geocoder = CachedGeocoder::new(
            counting(GeocodeOutcome::ServiceError(GeocodeError::Status(503))),
            storage.cache(),
            168,
        );

        let outcome = geocoder.resolve("Eiffel Tower").await;
        assert_eq!(outcome, GeocodeOutcome::ServiceError(GeocodeError::Status(503)));
        geocoder.resolve("Eiffel Tower").await;
        assert_eq!(geocoder.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_ttl_jitter_bounds() {
        let storage = temp_storage();
        let geocoder = CachedGeocoder::new(
            counting(GeocodeOutcome::NotFound),
            storage.cache(),
            100,
        );
        for _ in 0..50 {
            let hours = geocoder.jittered_ttl().as_secs() / 3600;
            assert!((89..=110).contains(&hours), "{hours}");
        }
    }
}
