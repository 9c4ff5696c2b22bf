use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

/// A place returned by the maps provider, not yet enriched.
///
/// Produced fresh per query and discarded after use; only `place_id` is a
/// stable identifier. Candidates without a usable place id are dropped at
/// the provider boundary since they cannot be tracked or cached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub location: Coordinate,
    pub rating: Option<f64>,
    pub rating_count: Option<u32>,
}
