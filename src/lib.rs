//! `TravelAI` - AI travel itinerary generation and mapping
//!
//! This library generates day-by-day itineraries from travel preferences,
//! extracts the places they mention, geocodes and classifies them for display
//! on a map, and keeps a per-user history of saved trips.

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod geocoding;
pub mod history;
pub mod itinerary;
pub mod logging;
pub mod models;
pub mod storage;
pub mod web;

// Re-export core types for public API
pub use config::TravelAiConfig;
pub use error::{ErrorCode, TravelAiError};
pub use generation::{GroqItineraryGenerator, ItineraryGenerator};
pub use geocoding::{GeocodeOutcome, Geocoder, NominatimClient};
pub use history::TripHistory;
pub use itinerary::{ExtractionReport, LocationExtractor, LocationPipeline};
pub use models::{Category, LocatedPoint, LocationCandidate, TravelPreferences, TripRecord};
pub use storage::Storage;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TravelAiError>;

#[cfg(test)]
pub(crate) mod test_support {
    use axum::Router;

    use crate::storage::Storage;

    /// Serve `router` on an ephemeral local port and return its base URL
    pub async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    /// Fresh database in a unique temporary directory
    pub fn temp_storage() -> Storage {
        let path = std::env::temp_dir().join(format!("travelai-test-{}", uuid::Uuid::new_v4()));
        Storage::open(path).unwrap()
    }
}
