//! Search orchestration: candidate discovery, enrichment fan-out, ranking.

mod geo;
mod ranking;
mod service;

pub use service::{SearchService, NEARBY_KEYWORD, NEARBY_RADIUS_M};

use serde::Serialize;
use thiserror::Error;

use crate::places::ProviderError;
use crate::shop_store::{ShopRecord, SmokingStatus};
use chrono::{DateTime, Utc};

/// Errors surfaced by the search service.
///
/// Only a failure of the primary candidate-producing provider call reaches
/// the caller; per-place enrichment failures degrade inside the pipeline.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Places provider request failed: {0}")]
    Provider(#[from] ProviderError),
}

/// One enriched search result as returned to clients.
#[derive(Clone, Debug, Serialize)]
pub struct EnrichedShop {
    pub id: String,
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u32>,
    pub smoking_status: SmokingStatus,
    pub positive_score: Option<u8>,
    pub negative_score: Option<u8>,
    pub summary: Option<String>,
    pub last_fetched_at: DateTime<Utc>,
    /// Present only for coordinate-based queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub walk_minutes: Option<u32>,
}

impl EnrichedShop {
    fn from_record(record: ShopRecord, distance_km: Option<f64>) -> Self {
        let walk_minutes = distance_km.map(geo::walk_minutes);
        EnrichedShop {
            id: record.place_id,
            name: record.name,
            address: record.address,
            lat: record.lat,
            lng: record.lng,
            rating: record.rating,
            user_ratings_total: record.rating_count,
            smoking_status: record.smoking_status,
            positive_score: record.positive_score,
            negative_score: record.negative_score,
            summary: record.summary,
            last_fetched_at: record.last_fetched_at,
            distance_km,
            walk_minutes,
        }
    }
}
