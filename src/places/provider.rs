use async_trait::async_trait;
use thiserror::Error;

use super::models::{Coordinate, PlaceCandidate};

/// Errors from the maps provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Provider returned status {status}")]
    Api {
        status: String,
        message: Option<String>,
    },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Capability interface for the external maps/places provider.
#[async_trait]
pub trait PlaceProvider: Send + Sync {
    /// Search for places around a coordinate matching a keyword.
    async fn nearby_search(
        &self,
        center: Coordinate,
        radius_m: u32,
        keyword: &str,
    ) -> Result<Vec<PlaceCandidate>, ProviderError>;

    /// Free-text place search.
    async fn text_search(&self, query: &str) -> Result<Vec<PlaceCandidate>, ProviderError>;

    /// Resolve a place name or address to a coordinate. `Ok(None)` means the
    /// provider found nothing for the query.
    async fn geocode(&self, query: &str) -> Result<Option<Coordinate>, ProviderError>;

    /// Fetch review texts for a place, bounded to the first few reviews.
    async fn place_reviews(&self, place_id: &str) -> Result<Vec<String>, ProviderError>;
}
