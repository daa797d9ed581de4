//! Itinerary generation through an OpenAI-compatible chat completions API

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::config::GenerationConfig;
use crate::error::ErrorCode;
use crate::models::TravelPreferences;
use crate::{Result, TravelAiError};

fn or_fallback<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() { fallback } else { value }
}

/// The instruction sent to the language model for one trip request
#[must_use]
pub fn build_prompt(preferences: &TravelPreferences) -> String {
    format!(
        "Create a detailed, personalized travel itinerary based on the following preferences:

Destination: {destination}
Duration: {duration}
Budget: {budget}
Number of travelers: {travelers}
Interests: {interests}
Accommodation preference: {accommodation}
Transportation preference: {transportation}
Additional requests: {additional}

Please create a comprehensive itinerary that includes:

1. A brief overview of the destination and why it's perfect for this trip
2. Day-by-day detailed schedule with:
   - Morning, afternoon, and evening activities
   - Specific attractions, restaurants, and experiences
   - Estimated costs and time requirements
   - Transportation between locations
3. Accommodation recommendations that fit the budget and preferences
4. Local tips and cultural insights
5. Budget breakdown and money-saving tips
6. Packing suggestions based on the destination and activities
7. Important travel information (best time to visit, local customs, etc.)

Make the itinerary engaging, practical, and tailored to the specified interests and budget. \
Include specific names of places, restaurants, and attractions where possible. \
Format the response with clear headings and sections for easy reading.",
        destination = preferences.destination,
        duration = preferences.duration,
        budget = preferences.budget,
        travelers = preferences.travelers,
        interests = preferences.interests.join(", "),
        accommodation = or_fallback(&preferences.accommodation, "No preference"),
        transportation = or_fallback(&preferences.transportation, "No preference"),
        additional = or_fallback(&preferences.additional_requests, "None"),
    )
}

/// File name offered when downloading an itinerary, e.g. `new_york_itinerary.txt`
#[must_use]
pub fn download_file_name(destination: &str) -> String {
    let stem: String = destination
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("{stem}_itinerary.txt")
}

/// Produces itinerary text for a set of travel preferences
#[async_trait]
pub trait ItineraryGenerator: Send + Sync {
    async fn generate(&self, preferences: &TravelPreferences) -> Result<String>;
}

/// Why a chat completion produced no itinerary
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("service responded with HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed response: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("response contained no itinerary")]
    Empty,
}

impl From<CompletionError> for TravelAiError {
    fn from(err: CompletionError) -> Self {
        match err {
            CompletionError::Request(_) => TravelAiError::api(err.to_string(), ErrorCode::ApiNetworkError),
            CompletionError::Decode(_) => TravelAiError::api(err.to_string(), ErrorCode::ApiInvalidResponse),
            CompletionError::Status { .. } | CompletionError::Empty => TravelAiError::generation(err.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Generator backed by Groq (or any OpenAI-compatible endpoint)
pub struct GroqItineraryGenerator {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl GroqItineraryGenerator {
    /// Build a generator; a missing API key is only reported when generating
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .build()
            .map_err(|e| TravelAiError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.resolved_api_key(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    async fn complete(&self, api_key: &str, prompt: String) -> std::result::Result<String, CompletionError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(CompletionError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(CompletionError::Decode)?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(CompletionError::Empty)
    }
}

#[async_trait]
impl ItineraryGenerator for GroqItineraryGenerator {
    #[instrument(skip_all, fields(destination = %preferences.destination, model = %self.model))]
    async fn generate(&self, preferences: &TravelPreferences) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            TravelAiError::config(
                "Groq API key is not configured. Set generation.api_key or the GROQ_API_KEY environment variable.",
            )
        })?;
        preferences.validate()?;

        let start_time = Instant::now();
        match self.complete(api_key, build_prompt(preferences)).await {
            Ok(itinerary) => {
                info!(
                    "Generated itinerary ({} chars) in {:.3}s",
                    itinerary.len(),
                    start_time.elapsed().as_secs_f64()
                );
                Ok(itinerary)
            }
            Err(reason) => {
                error!("Itinerary generation failed: {}", reason);
                Err(reason.into())
            }
        }
    }
}
