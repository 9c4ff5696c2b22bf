//! The search orchestrator.
//!
//! Turns a geographic query into a ranked, enriched result list. Two entry
//! modes: by coordinate (nearby search within a fixed radius, with distance
//! and walking-time estimation) and by keyword (geocode first, text search
//! as fallback).

use std::sync::Arc;
use tracing::{info, warn};

use crate::enrichment::EnrichmentCache;
use crate::places::{Coordinate, PlaceProvider};

use super::geo::haversine_km;
use super::ranking::sort_results;
use super::{EnrichedShop, SearchError};

/// Fixed search radius around a query coordinate, in meters.
pub const NEARBY_RADIUS_M: u32 = 3000;

/// Domain term used for provider queries, in the provider's result language.
pub const NEARBY_KEYWORD: &str = "麻雀";

pub struct SearchService {
    provider: Arc<dyn PlaceProvider>,
    cache: Arc<EnrichmentCache>,
}

impl SearchService {
    pub fn new(provider: Arc<dyn PlaceProvider>, cache: Arc<EnrichmentCache>) -> Self {
        Self { provider, cache }
    }

    /// Search around a coordinate. Results carry distance and walking time
    /// from the query point.
    pub async fn search_by_location(
        &self,
        lat: f64,
        lng: f64,
    ) -> Result<Vec<EnrichedShop>, SearchError> {
        let center = Coordinate { lat, lng };
        let candidates = self
            .provider
            .nearby_search(center, NEARBY_RADIUS_M, NEARBY_KEYWORD)
            .await?;
        info!(
            count = candidates.len(),
            lat, lng, "Nearby search returned candidates"
        );

        let records = self.cache.resolve_all(&candidates).await;

        let mut results: Vec<EnrichedShop> = candidates
            .iter()
            .zip(records)
            .map(|(candidate, record)| {
                let distance = haversine_km(center, candidate.location);
                EnrichedShop::from_record(record, Some(distance))
            })
            .collect();

        sort_results(&mut results);
        Ok(results)
    }

    /// Search by keyword. A keyword that geocodes as a place name delegates
    /// to the coordinate path; otherwise a free-text search is used, and no
    /// reference point exists for distances.
    pub async fn search_by_keyword(
        &self,
        keyword: &str,
    ) -> Result<Vec<EnrichedShop>, SearchError> {
        match self.provider.geocode(keyword).await {
            Ok(Some(center)) => {
                info!(keyword, lat = center.lat, lng = center.lng, "Keyword geocoded");
                self.search_by_location(center.lat, center.lng).await
            }
            Ok(None) => {
                info!(keyword, "Keyword did not geocode, using text search");
                self.text_search_fallback(keyword).await
            }
            Err(e) => {
                // Geocoding is best-effort; the text search may still work.
                warn!(keyword, error = %e, "Geocoding failed, using text search");
                self.text_search_fallback(keyword).await
            }
        }
    }

    async fn text_search_fallback(
        &self,
        keyword: &str,
    ) -> Result<Vec<EnrichedShop>, SearchError> {
        let query = format!("{} {}", keyword, NEARBY_KEYWORD);
        let candidates = self.provider.text_search(&query).await?;
        info!(count = candidates.len(), query = %query, "Text search returned candidates");

        let records = self.cache.resolve_all(&candidates).await;

        let mut results: Vec<EnrichedShop> = records
            .into_iter()
            .map(|record| EnrichedShop::from_record(record, None))
            .collect();

        sort_results(&mut results);
        Ok(results)
    }
}
