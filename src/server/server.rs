use anyhow::{Context, Result};
use axum::middleware;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::search::SearchService;

use super::http_layers::log_requests;
use super::routes::make_search_routes;
use super::state::ServerState;
use super::ServerConfig;

pub async fn run_server(config: ServerConfig, search: Arc<SearchService>) -> Result<()> {
    let state = ServerState::new(config.clone(), search);

    // The frontend is served from a different origin; mirror the original
    // deployment's fully permissive CORS policy.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = make_search_routes(state.clone())
        .layer(middleware::from_fn_with_state(state, log_requests))
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;

    info!("Listening on port {}", config.port);
    axum::serve(listener, app)
        .await
        .context("Server terminated unexpectedly")
}
