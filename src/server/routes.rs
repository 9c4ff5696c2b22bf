//! Search API routes.
//!
//! Thin layer: deserialization, calling the search service, and mapping
//! errors to status codes. A failed provider call is the only condition the
//! client sees as an error; everything else degrades inside the pipeline.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::search::{EnrichedShop, SearchError};

use super::state::ServerState;

#[derive(Deserialize)]
struct SearchByLocationBody {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct SearchByKeywordQuery {
    keyword: String,
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<EnrichedShop>,
}

#[derive(Serialize)]
struct ServerInfo {
    name: &'static str,
    version: &'static str,
    uptime_secs: u64,
}

fn into_http_response(
    result: Result<Vec<EnrichedShop>, SearchError>,
) -> axum::response::Response {
    match result {
        Ok(results) => Json(SearchResponse { results }).into_response(),
        Err(e @ SearchError::Provider(_)) => {
            error!(error = %e, "Search failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({"error": "places provider unavailable"})),
            )
                .into_response()
        }
    }
}

async fn search_by_location(
    State(state): State<ServerState>,
    Json(body): Json<SearchByLocationBody>,
) -> impl IntoResponse {
    into_http_response(
        state
            .search
            .search_by_location(body.latitude, body.longitude)
            .await,
    )
}

async fn search_by_keyword(
    State(state): State<ServerState>,
    Query(params): Query<SearchByKeywordQuery>,
) -> impl IntoResponse {
    into_http_response(state.search.search_by_keyword(&params.keyword).await)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    Json(ServerInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

pub fn make_search_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/api/search", post(search_by_location))
        .route("/api/search_by_keyword", get(search_by_keyword))
        .with_state(state)
}
