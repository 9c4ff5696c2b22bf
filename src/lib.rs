//! Jongso Server Library
//!
//! Mahjong parlor search with review-based enrichment. This library exposes
//! the internal modules for testing and potential reuse.

pub mod analysis;
pub mod config;
pub mod enrichment;
pub mod llm;
pub mod places;
pub mod search;
pub mod server;
pub mod shop_store;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use enrichment::EnrichmentCache;
pub use search::SearchService;
pub use server::{run_server, RequestsLoggingLevel, ServerConfig};
pub use shop_store::{NullShopStore, ShopStore, SqliteShopStore};
