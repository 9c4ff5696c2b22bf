//! SQLite schema for the enrichment store.
//!
//! A single table keyed by the external place id. Timestamps are stored as
//! fixed-width RFC3339 text so that SQL string comparison is chronological
//! (the upsert/touch monotonicity guards rely on this).

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

const JONGSO_SHOPS_TABLE: Table = Table {
    name: "jongso_shops",
    columns: &[
        sqlite_column!("place_id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("address", &SqlType::Text, non_null = true),
        sqlite_column!("lat", &SqlType::Real, non_null = true),
        sqlite_column!("lng", &SqlType::Real, non_null = true),
        sqlite_column!("rating", &SqlType::Real),
        sqlite_column!("rating_count", &SqlType::Integer),
        sqlite_column!(
            "smoking_status",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'unknown'")
        ),
        sqlite_column!("positive_score", &SqlType::Integer),
        sqlite_column!("negative_score", &SqlType::Integer),
        sqlite_column!("summary", &SqlType::Text),
        sqlite_column!("last_fetched_at", &SqlType::Text, non_null = true),
    ],
    indices: &[("idx_jongso_shops_fetched_at", "last_fetched_at")],
};

pub const SHOP_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 1,
    tables: &[JONGSO_SHOPS_TABLE],
    migration: None,
}];
