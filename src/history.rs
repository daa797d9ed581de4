//! Per-user trip history stored in the embedded database
//!
//! Records live under `trip:{user}:{id}`; `index:{user}` holds the user's trip
//! ids in insertion order so listings never scan other users' data.

use fjall::Keyspace;
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;
use tokio::task;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::models::{TravelPreferences, TripFilter, TripRecord};
use crate::{Result, TravelAiError};

fn trip_key(user_id: &str, id: Uuid) -> Vec<u8> {
    format!("trip:{user_id}:{id}").into_bytes()
}

fn index_key(user_id: &str) -> Vec<u8> {
    format!("index:{user_id}").into_bytes()
}

fn require_user(user_id: &str) -> Result<&str> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(TravelAiError::validation("A user id is required"));
    }
    Ok(user_id)
}

/// Saved itineraries, scoped by user
pub struct TripHistory {
    store: Keyspace,
    // serializes read-modify-write of the per-user index
    index_lock: Mutex<()>,
}

impl TripHistory {
    #[must_use]
    pub fn new(store: Keyspace) -> Self {
        Self {
            store,
            index_lock: Mutex::new(()),
        }
    }

    async fn read<T: DeserializeOwned>(&self, key: Vec<u8>) -> Result<Option<T>> {
        let store = self.store.clone();
        let bytes = task::spawn_blocking(move || store.get(key).map(|v| v.map(|v| v.to_vec())))
            .await??;
        Ok(bytes.map(|b| postcard::from_bytes(&b)).transpose()?)
    }

    async fn write<T: Serialize>(&self, key: Vec<u8>, value: &T) -> Result<()> {
        let bytes = postcard::to_stdvec(value)?;
        let store = self.store.clone();
        task::spawn_blocking(move || store.insert(key, bytes)).await??;
        Ok(())
    }

    async fn remove(&self, key: Vec<u8>) -> Result<()> {
        let store = self.store.clone();
        task::spawn_blocking(move || store.remove(key)).await??;
        Ok(())
    }

    async fn trip_ids(&self, user_id: &str) -> Result<Vec<Uuid>> {
        Ok(self.read(index_key(user_id)).await?.unwrap_or_default())
    }

    /// Save a generated itinerary; the title defaults to `"{destination} Trip"`
    #[instrument(skip(self, preferences, itinerary), fields(destination = %preferences.destination))]
    pub async fn save(
        &self,
        user_id: &str,
        preferences: &TravelPreferences,
        itinerary: &str,
        title: Option<&str>,
    ) -> Result<TripRecord> {
        let user_id = require_user(user_id)?;
        let record = TripRecord::new(user_id, preferences, itinerary, title);

        let _guard = self.index_lock.lock().await;
        self.write(trip_key(user_id, record.id), &record).await?;
        let mut ids = self.trip_ids(user_id).await?;
        ids.push(record.id);
        self.write(index_key(user_id), &ids).await?;

        info!("Saved trip {} ('{}')", record.id, record.trip_title);
        Ok(record)
    }

    /// The user's trips matching `filter`, newest first
    #[instrument(skip(self))]
    pub async fn list(&self, user_id: &str, filter: &TripFilter) -> Result<Vec<TripRecord>> {
        let user_id = require_user(user_id)?;

        let mut trips = Vec::new();
        for id in self.trip_ids(user_id).await? {
            match self.read::<TripRecord>(trip_key(user_id, id)).await? {
                Some(trip) if trip.matches(filter) => trips.push(trip),
                Some(_) => {}
                None => debug!("Index entry {} has no record", id),
            }
        }
        trips.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        debug!("Listed {} trips", trips.len());
        Ok(trips)
    }

    /// Case-insensitive search over destination, title and additional requests
    pub async fn search(&self, user_id: &str, query: &str) -> Result<Vec<TripRecord>> {
        let filter = TripFilter {
            query: Some(query.to_string()),
            ..TripFilter::default()
        };
        self.list(user_id, &filter).await
    }

    pub async fn get(&self, user_id: &str, id: Uuid) -> Result<TripRecord> {
        let user_id = require_user(user_id)?;
        self.read(trip_key(user_id, id))
            .await?
            .ok_or_else(|| TravelAiError::not_found(format!("Trip {id} not found")))
    }

    #[instrument(skip(self))]
    pub async fn set_favorite(&self, user_id: &str, id: Uuid, is_favorite: bool) -> Result<TripRecord> {
        let _guard = self.index_lock.lock().await;
        let mut trip = self.get(user_id, id).await?;
        trip.is_favorite = is_favorite;
        trip.updated_at = chrono::Utc::now();
        self.write(trip_key(&trip.user_id, id), &trip).await?;
        Ok(trip)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: &str, id: Uuid) -> Result<()> {
        let _guard = self.index_lock.lock().await;
        let trip = self.get(user_id, id).await?;

        self.remove(trip_key(&trip.user_id, id)).await?;
        let mut ids = self.trip_ids(&trip.user_id).await?;
        ids.retain(|existing| *existing != id);
        self.write(index_key(&trip.user_id), &ids).await?;

        info!("Deleted trip {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_support::temp_storage;

    fn prefs(destination: &str) -> TravelPreferences {
        TravelPreferences {
            destination: destination.to_string(),
            duration: "3 days".to_string(),
            budget: "mid-range".to_string(),
            travelers: "2".to_string(),
            interests: vec!["Food & Dining".to_string()],
            additional_requests: "Vegetarian options".to_string(),
            ..TravelPreferences::default()
        }
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let storage = temp_storage();
        let history = TripHistory::new(storage.trips());

        let saved = history
            .save("alice", &prefs("Lisbon"), "Day 1\nLunch at Time Out Market", None)
            .await
            .unwrap();
        assert_eq!(saved.trip_title, "Lisbon Trip");
        assert_eq!(saved.estimated_cost, "mid-range");
        assert!(!saved.is_favorite);

        let loaded = history.get("alice", saved.id).await.unwrap();
        assert_eq!(loaded, saved);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let storage = temp_storage();
        let history = TripHistory::new(storage.trips());

        let first = history.save("alice", &prefs("Lisbon"), "a", None).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = history.save("alice", &prefs("Porto"), "b", Some("Wine week")).await.unwrap();

        let trips = history.list("alice", &TripFilter::default()).await.unwrap();
        let ids: Vec<Uuid> = trips.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(trips[0].trip_title, "Wine week");
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let storage = temp_storage();
        let history = TripHistory::new(storage.trips());

        let trip = history.save("alice", &prefs("Lisbon"), "a", None).await.unwrap();
        history.save("bob", &prefs("Oslo"), "b", None).await.unwrap();

        let bobs = history.list("bob", &TripFilter::default()).await.unwrap();
        assert_eq!(bobs.len(), 1);
        assert_eq!(bobs[0].destination, "Oslo");

        let err = history.get("bob", trip.id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
        let err = history.delete("bob", trip.id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert!(history.get("alice", trip.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_favorites_filter() {
        let storage = temp_storage();
        let history = TripHistory::new(storage.trips());

        let lisbon = history.save("alice", &prefs("Lisbon"), "a", None).await.unwrap();
        history.save("alice", &prefs("Porto"), "b", None).await.unwrap();

        let updated = history.set_favorite("alice", lisbon.id, true).await.unwrap();
        assert!(updated.is_favorite);
        assert!(updated.updated_at >= lisbon.updated_at);

        let filter = TripFilter {
            favorites_only: true,
            ..TripFilter::default()
        };
        let favorites = history.list("alice", &filter).await.unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].id, lisbon.id);
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let storage = temp_storage();
        let history = TripHistory::new(storage.trips());

        history.save("alice", &prefs("Lisbon"), "a", None).await.unwrap();
        history.save("alice", &prefs("Porto"), "b", Some("Douro valley")).await.unwrap();

        assert_eq!(history.search("alice", "LISBON").await.unwrap().len(), 1);
        assert_eq!(history.search("alice", "douro").await.unwrap().len(), 1);
        assert_eq!(history.search("alice", "vegetarian").await.unwrap().len(), 2);
        assert!(history.search("alice", "tokyo").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_removes_from_listing() {
        let storage = temp_storage();
        let history = TripHistory::new(storage.trips());

        let trip = history.save("alice", &prefs("Lisbon"), "a", None).await.unwrap();
        history.delete("alice", trip.id).await.unwrap();

        assert!(history.list("alice", &TripFilter::default()).await.unwrap().is_empty());
        let err = history.get("alice", trip.id).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn test_blank_user_rejected() {
        let storage = temp_storage();
        let history = TripHistory::new(storage.trips());

        let err = history.save("  ", &prefs("Lisbon"), "a", None).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
    }
}
