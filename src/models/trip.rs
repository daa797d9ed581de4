//! Saved trip records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TravelPreferences;

/// A generated itinerary saved to a user's trip history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRecord {
    pub id: Uuid,
    pub user_id: String,
    pub destination: String,
    pub duration: String,
    pub budget: String,
    pub travelers: String,
    pub interests: Vec<String>,
    pub accommodation: Option<String>,
    pub transportation: Option<String>,
    pub additional_requests: Option<String>,
    pub itinerary_content: String,
    pub preferences: TravelPreferences,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_favorite: bool,
    pub trip_title: String,
    pub estimated_cost: String,
}

/// Listing filter for trip history
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripFilter {
    /// Only return favorites
    #[serde(default, rename = "favorites")]
    pub favorites_only: bool,
    /// Case-insensitive text matched against destination, title and requests
    #[serde(default, rename = "q")]
    pub query: Option<String>,
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl TripRecord {
    /// Build a new record for `user_id` from the form preferences and generated text
    #[must_use]
    pub fn new(
        user_id: &str,
        preferences: &TravelPreferences,
        itinerary: &str,
        title: Option<&str>,
    ) -> Self {
        let now = Utc::now();
        let trip_title = title
            .and_then(non_empty)
            .unwrap_or_else(|| format!("{} Trip", preferences.destination.trim()));

        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            destination: preferences.destination.clone(),
            duration: preferences.duration.clone(),
            budget: preferences.budget.clone(),
            travelers: preferences.travelers.clone(),
            interests: preferences.interests.clone(),
            accommodation: non_empty(&preferences.accommodation),
            transportation: non_empty(&preferences.transportation),
            additional_requests: non_empty(&preferences.additional_requests),
            itinerary_content: itinerary.to_string(),
            preferences: preferences.clone(),
            created_at: now,
            updated_at: now,
            is_favorite: false,
            trip_title,
            estimated_cost: preferences.budget.clone(),
        }
    }

    /// Whether this record matches a free-text search, case-insensitively
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        [
            Some(self.destination.as_str()),
            Some(self.trip_title.as_str()),
            self.additional_requests.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }

    #[must_use]
    pub fn matches(&self, filter: &TripFilter) -> bool {
        if filter.favorites_only && !self.is_favorite {
            return false;
        }
        filter
            .query
            .as_deref()
            .is_none_or(|query| self.matches_query(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs() -> TravelPreferences {
        TravelPreferences {
            destination: "Lisbon".to_string(),
            duration: "4 days".to_string(),
            budget: "budget".to_string(),
            travelers: "1".to_string(),
            interests: vec!["history".to_string()],
            accommodation: "hostel".to_string(),
            transportation: " ".to_string(),
            additional_requests: "Pastel de nata tour".to_string(),
        }
    }

    #[test]
    fn test_new_record_defaults() {
        let record = TripRecord::new("user-1", &prefs(), "Day 1\nVisit Belem Tower", None);
        assert_eq!(record.trip_title, "Lisbon Trip");
        assert_eq!(record.estimated_cost, "budget");
        assert_eq!(record.accommodation.as_deref(), Some("hostel"));
        assert_eq!(record.transportation, None);
        assert!(!record.is_favorite);
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn test_explicit_title() {
        let record = TripRecord::new("user-1", &prefs(), "text", Some("Solo Lisbon"));
        assert_eq!(record.trip_title, "Solo Lisbon");

        let record = TripRecord::new("user-1", &prefs(), "text", Some("  "));
        assert_eq!(record.trip_title, "Lisbon Trip");
    }

    #[test]
    fn test_query_matching() {
        let record = TripRecord::new("user-1", &prefs(), "text", None);
        assert!(record.matches_query("lisb"));
        assert!(record.matches_query("NATA"));
        assert!(record.matches_query(""));
        assert!(!record.matches_query("porto"));
    }

    #[test]
    fn test_favorites_filter() {
        let mut record = TripRecord::new("user-1", &prefs(), "text", None);
        let favorites = TripFilter {
            favorites_only: true,
            query: None,
        };
        assert!(!record.matches(&favorites));

        record.is_favorite = true;
        assert!(record.matches(&favorites));
        assert!(!record.matches(&TripFilter {
            favorites_only: true,
            query: Some("porto".to_string()),
        }));
    }
}
