//! Location models produced by the itinerary location pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

/// A place name pulled out of one itinerary line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationCandidate {
    /// Trimmed, non-empty place name
    pub name: String,
    /// The full line the name was found on
    pub source_line: String,
    /// Day the line belongs to (1-based)
    pub day_number: u32,
}

/// First match returned by the geocoding service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodeResult {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Canonical human-readable address
    pub display_address: String,
}

/// Coarse point-of-interest category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Attraction,
    Restaurant,
    Hotel,
    Activity,
}

impl Category {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Attraction => "attraction",
            Category::Restaurant => "restaurant",
            Category::Hotel => "hotel",
            Category::Activity => "activity",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A geocoded, classified, day-tagged point of interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatedPoint {
    /// `"{day}-{sequence}"`, unique within one extraction run
    pub id: String,
    pub name: String,
    pub address: String,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
    #[serde(rename = "day")]
    pub day_number: u32,
    #[serde(rename = "type")]
    pub category: Category,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_located_point_wire_names() {
        let point = LocatedPoint {
            id: "1-0".to_string(),
            name: "Eiffel Tower".to_string(),
            address: "Tour Eiffel, Paris, France".to_string(),
            latitude: 48.858_26,
            longitude: 2.294_5,
            day_number: 1,
            category: Category::Attraction,
        };

        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["id"], "1-0");
        assert_eq!(json["day"], 1);
        assert_eq!(json["type"], "attraction");
        assert_eq!(json["lat"], 48.858_26);
        assert_eq!(json["lng"], 2.294_5);
    }

    #[test]
    fn test_category_display() {
        assert_eq!(Category::Restaurant.to_string(), "restaurant");
        assert_eq!(
            serde_json::to_string(&Category::Activity).unwrap(),
            "\"activity\""
        );
    }
}
