//! Embedded fjall database holding the geocode cache and trip history

use anyhow::{Context, Result};
use fjall::{Database, Keyspace, KeyspaceCreateOptions};
use std::path::Path;
use tracing::info;

use crate::cache::PersistentCache;

const CACHE_KEYSPACE: &str = "geocode_cache";
const TRIPS_KEYSPACE: &str = "trips";

/// Open handles to every keyspace the application uses
pub struct Storage {
    _db: Database,
    cache: Keyspace,
    trips: Keyspace,
}

impl Storage {
    /// Open (or create) the database directory at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create storage directory {}", path.display()))?;

        let db = Database::builder(path)
            .open()
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        let cache = db.keyspace(CACHE_KEYSPACE, KeyspaceCreateOptions::default)?;
        let trips = db.keyspace(TRIPS_KEYSPACE, KeyspaceCreateOptions::default)?;

        info!("Opened storage at {}", path.display());
        Ok(Self {
            _db: db,
            cache,
            trips,
        })
    }

    #[must_use]
    pub fn cache(&self) -> PersistentCache {
        PersistentCache::new(self.cache.clone())
    }

    #[must_use]
    pub fn trips(&self) -> Keyspace {
        self.trips.clone()
    }
}
