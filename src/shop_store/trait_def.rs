//! ShopStore trait definition.
//!
//! Abstracts enrichment persistence so the pipeline can run against the
//! SQLite-backed store or, when no database is configured, the no-op
//! `NullShopStore` (always recompute, never persist).

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

use super::models::ShopRecord;

pub trait ShopStore: Send + Sync {
    /// Point lookup of one enrichment record.
    fn get_by_place_id(&self, place_id: &str) -> Result<Option<ShopRecord>>;

    /// Batched read of `last_fetched_at` for a set of place ids, in one
    /// round trip. Ids with no stored record are absent from the map.
    fn get_last_fetched(
        &self,
        place_ids: &[String],
    ) -> Result<HashMap<String, DateTime<Utc>>>;

    /// Insert or replace a record. `last_fetched_at` never moves backward:
    /// an upsert carrying an older timestamp than the stored row leaves the
    /// row untouched.
    fn upsert(&self, record: &ShopRecord) -> Result<()>;

    /// Advance `last_fetched_at` without touching analytical content.
    /// A no-op for a place with no stored record, and for a timestamp older
    /// than the stored one.
    fn touch(&self, place_id: &str, at: DateTime<Utc>) -> Result<()>;

    /// Number of stored records.
    fn count(&self) -> Result<usize>;
}
