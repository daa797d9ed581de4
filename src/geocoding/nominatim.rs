//! OpenStreetMap Nominatim client
//!
//! Issues `GET {base_url}/search?q=..&format=json&limit=1` and takes the first
//! result. Every request identifies the application through the configured
//! `User-Agent`, as required by the public Nominatim usage policy.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use super::{GeocodeError, GeocodeOutcome, Geocoder, RequestThrottle};
use crate::config::GeocodingConfig;
use crate::models::GeocodeResult;

/// One entry of the Nominatim search response; coordinates arrive as strings
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

fn parse_coordinate(field: &'static str, value: &str) -> Result<f64, GeocodeError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| GeocodeError::InvalidCoordinate {
            field,
            value: value.to_string(),
        })
}

impl TryFrom<NominatimPlace> for GeocodeResult {
    type Error = GeocodeError;

    fn try_from(place: NominatimPlace) -> Result<Self, Self::Error> {
        Ok(GeocodeResult {
            latitude: parse_coordinate("lat", &place.lat)?,
            longitude: parse_coordinate("lon", &place.lon)?,
            display_address: place.display_name,
        })
    }
}

/// Geocoder backed by a Nominatim-compatible search endpoint
pub struct NominatimClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl NominatimClient {
    /// Create a new client from the geocoding settings
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(config.user_agent.clone())
            .build()
            .with_context(|| "Failed to create HTTP client")?;

        // Middleware runs in registration order: the throttle sits inside the
        // retry layer so each retry attempt also waits for a request slot.
        let mut builder = ClientBuilder::new(client);
        if config.max_retries > 0 {
            let policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
            builder = builder.with(RetryTransientMiddleware::new_with_policy(policy));
        }
        let throttle = RequestThrottle::new(Duration::from_millis(config.min_request_interval_ms));

        Ok(Self {
            client: builder.with(throttle).build(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn search_url(&self, name: &str) -> String {
        format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url,
            urlencoding::encode(name)
        )
    }

    async fn lookup(&self, name: &str) -> Result<Option<GeocodeResult>, GeocodeError> {
        let start_time = Instant::now();

        let response = self
            .client
            .get(self.search_url(name))
            .send()
            .await
            .map_err(|e| GeocodeError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| GeocodeError::Decode(e.to_string()))?;

        let total_duration = start_time.elapsed();
        if total_duration.as_secs() > 5 {
            warn!(
                "Slow geocoding response: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        let Some(place) = places.into_iter().next() else {
            debug!("No geocoding results for '{}'", name);
            return Ok(None);
        };

        let result = GeocodeResult::try_from(place)?;
        info!(
            "Geocoded '{}' to ({:.4}, {:.4}) in {:.3}s",
            name,
            result.latitude,
            result.longitude,
            total_duration.as_secs_f64()
        );
        Ok(Some(result))
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    #[instrument(skip(self), fields(location = name))]
    async fn resolve(&self, name: &str) -> GeocodeOutcome {
        self.lookup(name).await.into()
    }
}
