use anyhow::{Result, anyhow};
use fjall::Keyspace;
use serde::Deserialize;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task;

#[derive(Serialize, Deserialize)]
struct StoredEntry<T> {
    value: T,
    expires_at: u64, // Unix timestamp (seconds)
}

/// Expiring key/value cache on top of one fjall keyspace
#[derive(Clone)]
pub struct PersistentCache {
    store: Keyspace,
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|v| v.to_vec()))
}

fn now_secs() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

impl PersistentCache {
    #[must_use]
    pub fn new(store: Keyspace) -> Self {
        PersistentCache { store }
    }

    /// Stores a serializable value with a time-to-live (TTL).
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value))]
    pub async fn put<T: Serialize + Send + Debug + 'static>(
        &self,
        key: &str,
        value: T,
        ttl: Duration,
    ) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        let expires_at = SystemTime::now()
            .checked_add(ttl)
            .ok_or(anyhow!("TTL overflow"))?
            .duration_since(UNIX_EPOCH)?
            .as_secs();
        let entry = StoredEntry { value, expires_at };
        let bytes = postcard::to_stdvec(&entry)?;

        task::spawn_blocking(move || store.insert(key, bytes)).await??;
        Ok(())
    }

    /// Retrieves a value if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Result<Option<T>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes: Option<Vec<u8>> =
            task::spawn_blocking(move || get_from_store(store, key_bytes)).await??;

        let Some(bytes) = maybe_bytes else {
            tracing::debug!("Key not found");
            return Ok(None);
        };

        let entry: StoredEntry<T> = match postcard::from_bytes(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Dropping undecodable cache entry: {}", e);
                self.remove(key).await?;
                return Ok(None);
            }
        };

        if now_secs()? < entry.expires_at {
            tracing::debug!("Key found and still fresh");
            Ok(Some(entry.value))
        } else {
            tracing::debug!("Key found but expired");
            self.remove(key).await?;
            Ok(None)
        }
    }

    /// Manually removes a key from the cache.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let key = key.as_bytes().to_vec();
        let store = self.store.clone();
        task::spawn_blocking(move || store.remove(key)).await??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::temp_storage;

    #[tokio::test]
    async fn test_put_then_get() {
        let storage = temp_storage();
        let cache = storage.cache();
        cache
            .put("geocode:eiffel tower", (48.8584_f64, 2.2945_f64), Duration::from_secs(60))
            .await
            .unwrap();

        let value: Option<(f64, f64)> = cache.get("geocode:eiffel tower").await.unwrap();
        assert_eq!(value, Some((48.8584, 2.2945)));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let storage = temp_storage();
        let cache = storage.cache();
        let value: Option<String> = cache.get("nothing here").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_removed() {
        let storage = temp_storage();
        let cache = storage.cache();
        cache
            .put("stale", "value".to_string(), Duration::ZERO)
            .await
            .unwrap();

        let value: Option<String> = cache.get("stale").await.unwrap();
        assert!(value.is_none());
        assert!(get_from_store(cache.store.clone(), b"stale".to_vec()).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove() {
        let storage = temp_storage();
        let cache = storage.cache();
        cache
            .put("key", 7_u32, Duration::from_secs(60))
            .await
            .unwrap();
        cache.remove("key").await.unwrap();

        let value: Option<u32> = cache.get("key").await.unwrap();
        assert!(value.is_none());
    }
}
