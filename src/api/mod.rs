//! JSON API mounted under `/api`

use std::sync::Arc;

use axum::{
    Router,
    extract::{
        FromRequestParts, Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, request::Parts},
    response::Json,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::TravelAiError;
use crate::config::TravelAiConfig;
use crate::generation::{GroqItineraryGenerator, ItineraryGenerator, download_file_name};
use crate::geocoding::{CachedGeocoder, NominatimClient};
use crate::history::TripHistory;
use crate::storage::Storage;
use crate::itinerary::{ExtractionReport, LocationPipeline};
use crate::models::{TravelPreferences, TripFilter, TripRecord};

mod error;

pub use error::ApiError;

/// Header carrying the caller identity, set by the upstream identity proxy
pub const USER_ID_HEADER: &str = "x-user-id";

/// Shared services behind the API
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn ItineraryGenerator>,
    pub pipeline: LocationPipeline,
    pub history: Arc<TripHistory>,
}

impl AppState {
    /// Wire the production services: cached Nominatim geocoding, Groq generation,
    /// and trip history in `storage`
    pub fn from_config(config: &TravelAiConfig, storage: &Storage) -> anyhow::Result<Self> {
        let geocoder = CachedGeocoder::new(
            NominatimClient::new(&config.geocoding)?,
            storage.cache(),
            config.geocoding.cache_ttl_hours,
        );
        let pipeline = LocationPipeline::new(Arc::new(geocoder))
            .with_concurrency(config.pipeline.concurrency);

        Ok(Self {
            generator: Arc::new(GroqItineraryGenerator::new(&config.generation)?),
            pipeline,
            history: Arc::new(TripHistory::new(storage.trips())),
        })
    }
}

/// Identity of the calling user, from the `x-user-id` header
#[derive(Debug, Clone)]
pub struct UserId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for UserId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| UserId(value.to_string()))
            .ok_or_else(|| ApiError(TravelAiError::unauthorized("Please sign in to manage your trips")))
    }
}

#[derive(Deserialize)]
pub struct GenerateRequest {
    pub preferences: TravelPreferences,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub itinerary: String,
    pub file_name: String,
}

#[derive(Deserialize)]
pub struct ExtractRequest {
    pub itinerary: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveTripRequest {
    pub preferences: TravelPreferences,
    pub itinerary: String,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    pub is_favorite: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/itineraries", post(generate_itinerary))
        .route("/locations", post(extract_locations))
        .route("/trips", get(list_trips).post(save_trip))
        .route("/trips/{id}", get(get_trip).delete(delete_trip))
        .route("/trips/{id}/favorite", put(set_favorite))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "version": crate::VERSION }))
}

async fn generate_itinerary(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(request) = payload?;
    request.preferences.validate()?;

    let itinerary = state.generator.generate(&request.preferences).await?;
    Ok(Json(GenerateResponse {
        itinerary,
        file_name: download_file_name(&request.preferences.destination),
    }))
}

async fn extract_locations(
    State(state): State<AppState>,
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<ExtractionReport>, ApiError> {
    let Json(request) = payload?;
    Ok(Json(state.pipeline.extract_locations(&request.itinerary).await))
}

async fn list_trips(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    filter: Result<Query<TripFilter>, QueryRejection>,
) -> Result<Json<Vec<TripRecord>>, ApiError> {
    let Query(filter) = filter?;
    Ok(Json(state.history.list(&user_id, &filter).await?))
}

async fn save_trip(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    payload: Result<Json<SaveTripRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TripRecord>), ApiError> {
    let Json(request) = payload?;
    let trip = state
        .history
        .save(
            &user_id,
            &request.preferences,
            &request.itinerary,
            request.title.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(trip)))
}

async fn get_trip(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<TripRecord>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.history.get(&user_id, id).await?))
}

async fn set_favorite(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<FavoriteRequest>, JsonRejection>,
) -> Result<Json<TripRecord>, ApiError> {
    let Path(id) = id?;
    let Json(request) = payload?;
    Ok(Json(
        state
            .history
            .set_favorite(&user_id, id, request.is_favorite)
            .await?,
    ))
}

async fn delete_trip(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    state.history.delete(&user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
