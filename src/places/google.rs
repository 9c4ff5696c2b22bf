//! Google Places / Geocoding API client.
//!
//! Implements `PlaceProvider` against the Places Nearby Search, Text Search,
//! Place Details and Geocoding web APIs. Results are requested in Japanese
//! (`language=ja`), matching the deployment this service targets.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::models::{Coordinate, PlaceCandidate};
use super::provider::{PlaceProvider, ProviderError};

const PLACES_API_BASE: &str = "https://maps.googleapis.com/maps/api";
const LANGUAGE: &str = "ja";

/// Reviews fetched per place. Only the first few carry signal; more just
/// inflates the classification prompt.
const MAX_REVIEWS: usize = 5;

pub struct GooglePlacesClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

// Google Places wire types

#[derive(Deserialize)]
struct PlacesSearchResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<RawPlace>,
}

#[derive(Deserialize)]
struct RawPlace {
    place_id: Option<String>,
    name: Option<String>,
    vicinity: Option<String>,
    formatted_address: Option<String>,
    geometry: Option<RawGeometry>,
    rating: Option<f64>,
    user_ratings_total: Option<u32>,
}

#[derive(Deserialize)]
struct RawGeometry {
    location: RawLatLng,
}

#[derive(Deserialize)]
struct RawLatLng {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct GeocodeResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Deserialize)]
struct GeocodeResult {
    geometry: RawGeometry,
}

#[derive(Deserialize)]
struct DetailsResponse {
    status: String,
    error_message: Option<String>,
    result: Option<RawPlaceDetails>,
}

#[derive(Deserialize)]
struct RawPlaceDetails {
    #[serde(default)]
    reviews: Vec<RawReview>,
}

#[derive(Deserialize)]
struct RawReview {
    text: Option<String>,
}

impl RawPlace {
    /// Convert to a candidate, or `None` when the entry is unusable.
    ///
    /// A place without a `place_id` cannot be tracked or cached, and one
    /// without a geometry cannot be ranked by distance, so both are dropped.
    fn into_candidate(self) -> Option<PlaceCandidate> {
        let place_id = self.place_id.filter(|id| !id.is_empty())?;
        let geometry = self.geometry?;
        Some(PlaceCandidate {
            place_id,
            name: self.name.unwrap_or_default(),
            address: self
                .vicinity
                .or(self.formatted_address)
                .unwrap_or_default(),
            location: Coordinate {
                lat: geometry.location.lat,
                lng: geometry.location.lng,
            },
            rating: self.rating,
            rating_count: self.user_ratings_total,
        })
    }
}

fn map_transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Connection(e.to_string())
    }
}

/// Check a Google API status field. `ZERO_RESULTS` is a successful empty
/// answer, anything else besides `OK` is an API-level failure.
fn check_status(status: &str, error_message: Option<String>) -> Result<bool, ProviderError> {
    match status {
        "OK" => Ok(true),
        "ZERO_RESULTS" => Ok(false),
        other => Err(ProviderError::Api {
            status: other.to_string(),
            message: error_message,
        }),
    }
}

impl GooglePlacesClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: PLACES_API_BASE.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Override the API base URL (for tests against a local stub).
    #[allow(dead_code)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, ProviderError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(ProviderError::Api {
                status: response.status().to_string(),
                message: None,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }

    async fn search_places(&self, url: &str) -> Result<Vec<PlaceCandidate>, ProviderError> {
        let body: PlacesSearchResponse = self.get_json(url).await?;
        if !check_status(&body.status, body.error_message)? {
            return Ok(vec![]);
        }

        let total = body.results.len();
        let candidates: Vec<PlaceCandidate> = body
            .results
            .into_iter()
            .filter_map(RawPlace::into_candidate)
            .collect();
        if candidates.len() < total {
            warn!(
                "Dropped {} place(s) without a usable place_id or geometry",
                total - candidates.len()
            );
        }
        Ok(candidates)
    }
}

#[async_trait]
impl PlaceProvider for GooglePlacesClient {
    async fn nearby_search(
        &self,
        center: Coordinate,
        radius_m: u32,
        keyword: &str,
    ) -> Result<Vec<PlaceCandidate>, ProviderError> {
        let url = format!(
            "{}/place/nearbysearch/json?location={},{}&radius={}&keyword={}&type=establishment&language={}&key={}",
            self.base_url,
            center.lat,
            center.lng,
            radius_m,
            urlencoding::encode(keyword),
            LANGUAGE,
            self.api_key
        );

        debug!(
            lat = center.lat,
            lng = center.lng,
            radius_m,
            "Nearby search"
        );
        self.search_places(&url).await
    }

    async fn text_search(&self, query: &str) -> Result<Vec<PlaceCandidate>, ProviderError> {
        let url = format!(
            "{}/place/textsearch/json?query={}&language={}&key={}",
            self.base_url,
            urlencoding::encode(query),
            LANGUAGE,
            self.api_key
        );

        debug!(query, "Text search");
        self.search_places(&url).await
    }

    async fn geocode(&self, query: &str) -> Result<Option<Coordinate>, ProviderError> {
        let url = format!(
            "{}/geocode/json?address={}&language={}&key={}",
            self.base_url,
            urlencoding::encode(query),
            LANGUAGE,
            self.api_key
        );

        debug!(query, "Geocoding");
        let body: GeocodeResponse = self.get_json(&url).await?;
        if !check_status(&body.status, body.error_message)? {
            return Ok(None);
        }

        Ok(body.results.into_iter().next().map(|r| Coordinate {
            lat: r.geometry.location.lat,
            lng: r.geometry.location.lng,
        }))
    }

    async fn place_reviews(&self, place_id: &str) -> Result<Vec<String>, ProviderError> {
        let url = format!(
            "{}/place/details/json?place_id={}&fields=reviews&language={}&key={}",
            self.base_url,
            urlencoding::encode(place_id),
            LANGUAGE,
            self.api_key
        );

        debug!(place_id, "Fetching place reviews");
        let body: DetailsResponse = self.get_json(&url).await?;
        if !check_status(&body.status, body.error_message)? {
            return Ok(vec![]);
        }

        let reviews = body
            .result
            .map(|r| r.reviews)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|r| r.text)
            .filter(|t| !t.is_empty())
            .take(MAX_REVIEWS)
            .collect();
        Ok(reviews)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_place_with_full_fields_converts() {
        let raw: RawPlace = serde_json::from_value(serde_json::json!({
            "place_id": "abc123",
            "name": "West Pond Mahjong",
            "vicinity": "2-1 Ikebukuro",
            "geometry": {"location": {"lat": 35.73, "lng": 139.71}},
            "rating": 4.1,
            "user_ratings_total": 33
        }))
        .unwrap();

        let candidate = raw.into_candidate().unwrap();
        assert_eq!(candidate.place_id, "abc123");
        assert_eq!(candidate.name, "West Pond Mahjong");
        assert_eq!(candidate.address, "2-1 Ikebukuro");
        assert_eq!(candidate.rating, Some(4.1));
        assert_eq!(candidate.rating_count, Some(33));
    }

    #[test]
    fn raw_place_without_place_id_is_dropped() {
        let raw: RawPlace = serde_json::from_value(serde_json::json!({
            "name": "Nameless",
            "geometry": {"location": {"lat": 35.0, "lng": 139.0}}
        }))
        .unwrap();
        assert!(raw.into_candidate().is_none());

        let raw: RawPlace = serde_json::from_value(serde_json::json!({
            "place_id": "",
            "name": "Empty id",
            "geometry": {"location": {"lat": 35.0, "lng": 139.0}}
        }))
        .unwrap();
        assert!(raw.into_candidate().is_none());
    }

    #[test]
    fn raw_place_without_geometry_is_dropped() {
        let raw: RawPlace = serde_json::from_value(serde_json::json!({
            "place_id": "abc",
            "name": "No location"
        }))
        .unwrap();
        assert!(raw.into_candidate().is_none());
    }

    #[test]
    fn raw_place_falls_back_to_formatted_address() {
        let raw: RawPlace = serde_json::from_value(serde_json::json!({
            "place_id": "abc",
            "name": "Text result",
            "formatted_address": "Tokyo, Chiyoda 1-1",
            "geometry": {"location": {"lat": 35.0, "lng": 139.0}}
        }))
        .unwrap();
        assert_eq!(raw.into_candidate().unwrap().address, "Tokyo, Chiyoda 1-1");
    }

    #[test]
    fn status_ok_and_zero_results_are_success() {
        assert!(check_status("OK", None).unwrap());
        assert!(!check_status("ZERO_RESULTS", None).unwrap());
    }

    #[test]
    fn status_failure_surfaces_api_error() {
        let err = check_status("REQUEST_DENIED", Some("bad key".to_string())).unwrap_err();
        match err {
            ProviderError::Api { status, message } => {
                assert_eq!(status, "REQUEST_DENIED");
                assert_eq!(message, Some("bad key".to_string()));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn search_response_parses_without_results_field() {
        let body: PlacesSearchResponse =
            serde_json::from_str(r#"{"status": "ZERO_RESULTS"}"#).unwrap();
        assert!(body.results.is_empty());
    }
}
