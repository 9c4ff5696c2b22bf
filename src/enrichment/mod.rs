//! Enrichment resolution with a time-based freshness policy.

mod cache;

pub use cache::{EnrichmentCache, DEFAULT_FRESHNESS_DAYS, DEFAULT_WRITE_CONCURRENCY};
