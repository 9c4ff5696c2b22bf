//! Null shop store implementation.
//!
//! Used when no database is configured: every lookup misses and every write
//! succeeds as a no-op, so the pipeline runs in an always-recompute,
//! never-persist mode instead of failing hard.

use super::models::ShopRecord;
use super::trait_def::ShopStore;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

pub struct NullShopStore;

impl ShopStore for NullShopStore {
    fn get_by_place_id(&self, _place_id: &str) -> Result<Option<ShopRecord>> {
        Ok(None)
    }

    fn get_last_fetched(
        &self,
        _place_ids: &[String],
    ) -> Result<HashMap<String, DateTime<Utc>>> {
        Ok(HashMap::new())
    }

    fn upsert(&self, _record: &ShopRecord) -> Result<()> {
        Ok(())
    }

    fn touch(&self, _place_id: &str, _at: DateTime<Utc>) -> Result<()> {
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        Ok(0)
    }
}
