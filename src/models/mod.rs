pub mod location;
pub mod preferences;
pub mod trip;

pub use location::{Category, GeocodeResult, LocatedPoint, LocationCandidate};
pub use preferences::TravelPreferences;
pub use trip::{TripFilter, TripRecord};
