//! Geocoding of extracted place names
//!
//! A [`Geocoder`] resolves a free-text place name to coordinates. Resolution
//! has three outcomes that callers must handle explicitly: a match, no match,
//! or a service failure. Neither of the latter two is fatal to an extraction
//! run.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::GeocodeResult;

pub mod cached;
pub mod nominatim;
pub mod throttle;

pub use cached::CachedGeocoder;
pub use nominatim::NominatimClient;
pub use throttle::RequestThrottle;

/// Why a geocoding request could not be answered
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeocodeError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("service responded with HTTP {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("invalid {field} in response: {value:?}")]
    InvalidCoordinate { field: &'static str, value: String },
}

/// Result of resolving one place name
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeOutcome {
    Found(GeocodeResult),
    NotFound,
    ServiceError(GeocodeError),
}

impl GeocodeOutcome {
    #[must_use]
    pub fn found(&self) -> Option<&GeocodeResult> {
        match self {
            GeocodeOutcome::Found(result) => Some(result),
            _ => None,
        }
    }
}

impl From<Result<Option<GeocodeResult>, GeocodeError>> for GeocodeOutcome {
    fn from(result: Result<Option<GeocodeResult>, GeocodeError>) -> Self {
        match result {
            Ok(Some(found)) => GeocodeOutcome::Found(found),
            Ok(None) => GeocodeOutcome::NotFound,
            Err(err) => GeocodeOutcome::ServiceError(err),
        }
    }
}

/// Resolves place names to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, name: &str) -> GeocodeOutcome;
}

#[async_trait]
impl<G: Geocoder + ?Sized> Geocoder for std::sync::Arc<G> {
    async fn resolve(&self, name: &str) -> GeocodeOutcome {
        (**self).resolve(name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_result() {
        let found = GeocodeResult {
            latitude: 48.8584,
            longitude: 2.2945,
            display_address: "Eiffel Tower, Paris".to_string(),
        };

        let outcome: GeocodeOutcome = Ok(Some(found.clone())).into();
        assert_eq!(outcome.found(), Some(&found));

        let outcome: GeocodeOutcome = Ok(None).into();
        assert_eq!(outcome, GeocodeOutcome::NotFound);

        let outcome: GeocodeOutcome = Err(GeocodeError::Status(503)).into();
        assert!(matches!(outcome, GeocodeOutcome::ServiceError(GeocodeError::Status(503))));
        assert!(outcome.found().is_none());
    }

    #[test]
    fn test_error_messages() {
        let err = GeocodeError::InvalidCoordinate {
            field: "lat",
            value: "north".to_string(),
        };
        assert_eq!(err.to_string(), "invalid lat in response: \"north\"");
        assert_eq!(GeocodeError::Status(429).to_string(), "service responded with HTTP 429");
    }
}
