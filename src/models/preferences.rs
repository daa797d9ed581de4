//! Travel preferences collected from the planner form

use serde::{Deserialize, Serialize};

use crate::TravelAiError;

/// Preferences record sent to the itinerary generator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TravelPreferences {
    pub destination: String,
    pub duration: String,
    pub budget: String,
    pub travelers: String,
    pub interests: Vec<String>,
    pub accommodation: String,
    pub transportation: String,
    pub additional_requests: String,
}

impl TravelPreferences {
    /// Destination, duration and budget are required before generating
    pub fn validate(&self) -> crate::Result<()> {
        let missing: Vec<&str> = [
            ("destination", &self.destination),
            ("duration", &self.duration),
            ("budget", &self.budget),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(TravelAiError::validation(format!(
                "Please fill in destination, duration, and budget (missing: {})",
                missing.join(", ")
            )))
        }
    }
}
