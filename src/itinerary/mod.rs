//! Location extraction from generated itineraries

pub mod classifier;
pub mod extractor;
pub mod pipeline;

pub use classifier::classify;
pub use extractor::{ExtractionRule, LocationExtractor, extract_candidates, parse_day_marker};
pub use pipeline::{ExtractionReport, LocationPipeline};
