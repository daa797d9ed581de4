//! Itinerary text to located points
//!
//! Runs the extractor, resolves each candidate through a [`Geocoder`], and
//! folds the outcomes into an [`ExtractionReport`]. Geocoding may run with
//! bounded concurrency; results are still consumed in candidate order so ids
//! and output order match the sequential run exactly.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{LocationExtractor, classify};
use crate::geocoding::{GeocodeOutcome, Geocoder};
use crate::models::{LocatedPoint, LocationCandidate};

/// Points found in one itinerary, plus what was dropped along the way
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionReport {
    pub points: Vec<LocatedPoint>,
    /// Candidates the extractor produced
    pub candidates: usize,
    /// Candidates the geocoder had no match for
    pub not_found: usize,
    /// Candidates dropped because the geocoder failed
    pub failed: usize,
}

impl ExtractionReport {
    fn record(&mut self, candidate: LocationCandidate, outcome: GeocodeOutcome) {
        match outcome {
            GeocodeOutcome::Found(result) => {
                let id = format!("{}-{}", candidate.day_number, self.points.len());
                let category = classify(&candidate.name, &candidate.source_line);
                debug!(id = %id, %category, "Located '{}'", candidate.name);
                self.points.push(LocatedPoint {
                    id,
                    name: candidate.name,
                    address: result.display_address,
                    latitude: result.latitude,
                    longitude: result.longitude,
                    day_number: candidate.day_number,
                    category,
                });
            }
            GeocodeOutcome::NotFound => {
                debug!("No match for '{}'", candidate.name);
                self.not_found += 1;
            }
            GeocodeOutcome::ServiceError(err) => {
                warn!("Skipping '{}': geocoding failed: {}", candidate.name, err);
                self.failed += 1;
            }
        }
    }
}

/// Extraction, geocoding and classification wired together
#[derive(Clone)]
pub struct LocationPipeline {
    extractor: LocationExtractor,
    geocoder: Arc<dyn Geocoder>,
    concurrency: usize,
}

impl LocationPipeline {
    /// Sequential pipeline using the built-in extraction rules
    #[must_use]
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            extractor: LocationExtractor::default(),
            geocoder,
            concurrency: 1,
        }
    }

    #[must_use]
    pub fn with_extractor(mut self, extractor: LocationExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Allow up to `concurrency` geocoder calls in flight (values below 1 mean 1)
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    #[instrument(skip_all, fields(chars = itinerary.len(), concurrency = self.concurrency))]
    pub async fn extract_locations(&self, itinerary: &str) -> ExtractionReport {
        let candidates = self.extractor.extract(itinerary);
        let initial = ExtractionReport {
            candidates: candidates.len(),
            ..ExtractionReport::default()
        };

        let geocoder = &self.geocoder;
        let report = stream::iter(candidates)
            .map(|candidate| async move {
                let outcome = geocoder.resolve(&candidate.name).await;
                (candidate, outcome)
            })
            .buffered(self.concurrency)
            .fold(initial, |mut report, (candidate, outcome)| async move {
                report.record(candidate, outcome);
                report
            })
            .await;

        info!(
            "Extracted {} of {} candidate locations ({} not found, {} failed)",
            report.points.len(),
            report.candidates,
            report.not_found,
            report.failed
        );
        report
    }

    /// Just the located points
    pub async fn points(&self, itinerary: &str) -> Vec<LocatedPoint> {
        self.extract_locations(itinerary).await.points
    }
}
