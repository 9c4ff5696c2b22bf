use axum::extract::FromRef;
use std::sync::Arc;
use std::time::Instant;

use crate::search::SearchService;

use super::ServerConfig;

pub type GuardedSearchService = Arc<SearchService>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub search: GuardedSearchService,
}

impl ServerState {
    pub fn new(config: ServerConfig, search: GuardedSearchService) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            search,
        }
    }
}

impl FromRef<ServerState> for GuardedSearchService {
    fn from_ref(input: &ServerState) -> Self {
        input.search.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
