//! SQLite-backed enrichment store.

use super::models::{ShopRecord, SmokingStatus};
use super::schema::SHOP_VERSIONED_SCHEMAS;
use super::trait_def::ShopStore;
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::info;

pub struct SqliteShopStore {
    conn: Arc<Mutex<Connection>>,
}

/// Fixed-width UTC timestamp. Microsecond precision keeps every stored value
/// the same length, so the SQL `max()` / comparison guards order correctly.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl SqliteShopStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();
        let is_new_db = !path.exists();

        let mut conn = Connection::open(path).context("Failed to open shop database")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        if is_new_db {
            info!("Creating new shop database at {:?}", path);
            SHOP_VERSIONED_SCHEMAS.last().unwrap().create(&conn)?;
        } else {
            let raw_version: i64 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
            let db_version = raw_version - BASE_DB_VERSION as i64;

            if db_version < 1 {
                anyhow::bail!(
                    "Shop database version {} is invalid (expected >= 1)",
                    db_version
                );
            }

            let current_schema_version = SHOP_VERSIONED_SCHEMAS.last().unwrap().version as i64;

            let version_index = SHOP_VERSIONED_SCHEMAS
                .iter()
                .position(|s| s.version == db_version as usize)
                .with_context(|| format!("Unknown shop database version {}", db_version))?;
            SHOP_VERSIONED_SCHEMAS[version_index]
                .validate(&conn)
                .with_context(|| {
                    format!(
                        "Shop database schema validation failed for version {}",
                        db_version
                    )
                })?;

            if db_version < current_schema_version {
                info!(
                    "Migrating shop database from version {} to {}",
                    db_version, current_schema_version
                );
                Self::migrate(&mut conn, db_version as usize)?;
            }
        }

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn migrate(conn: &mut Connection, from_version: usize) -> Result<()> {
        let tx = conn.transaction()?;
        let mut latest = from_version;
        for schema in SHOP_VERSIONED_SCHEMAS.iter() {
            if schema.version > from_version {
                if let Some(migration_fn) = schema.migration {
                    info!(
                        "Running shop database migration from version {} to {}",
                        latest, schema.version
                    );
                    migration_fn(&tx).with_context(|| {
                        format!("Failed to run migration to version {}", schema.version)
                    })?;
                }
                latest = schema.version;
            }
        }
        tx.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + latest),
            [],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<ShopRecord> {
        let smoking_str: String = row.get("smoking_status")?;
        let fetched_str: String = row.get("last_fetched_at")?;
        let positive: Option<i64> = row.get("positive_score")?;
        let negative: Option<i64> = row.get("negative_score")?;
        let rating_count: Option<i64> = row.get("rating_count")?;

        Ok(ShopRecord {
            place_id: row.get("place_id")?,
            name: row.get("name")?,
            address: row.get("address")?,
            lat: row.get("lat")?,
            lng: row.get("lng")?,
            rating: row.get("rating")?,
            rating_count: rating_count.map(|c| c.max(0) as u32),
            smoking_status: SmokingStatus::from_db_str(&smoking_str),
            positive_score: positive.map(|p| p.clamp(0, 10) as u8),
            negative_score: negative.map(|n| n.clamp(0, 10) as u8),
            summary: row.get("summary")?,
            last_fetched_at: parse_datetime(&fetched_str),
        })
    }
}

impl ShopStore for SqliteShopStore {
    fn get_by_place_id(&self, place_id: &str) -> Result<Option<ShopRecord>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT place_id, name, address, lat, lng, rating, rating_count,
                    smoking_status, positive_score, negative_score, summary, last_fetched_at
             FROM jongso_shops WHERE place_id = ?1",
            params![place_id],
            Self::row_to_record,
        )
        .optional()
        .context("Failed to query shop record")
    }

    fn get_last_fetched(
        &self,
        place_ids: &[String],
    ) -> Result<HashMap<String, DateTime<Utc>>> {
        if place_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let conn = self.conn.lock().unwrap();
        let placeholders = vec!["?"; place_ids.len()].join(", ");
        let mut stmt = conn.prepare(&format!(
            "SELECT place_id, last_fetched_at FROM jongso_shops WHERE place_id IN ({})",
            placeholders
        ))?;

        let rows = stmt.query_map(params_from_iter(place_ids.iter()), |row| {
            let place_id: String = row.get(0)?;
            let fetched_str: String = row.get(1)?;
            Ok((place_id, fetched_str))
        })?;

        let mut result = HashMap::new();
        for row in rows {
            let (place_id, fetched_str) = row?;
            result.insert(place_id, parse_datetime(&fetched_str));
        }
        Ok(result)
    }

    fn upsert(&self, record: &ShopRecord) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO jongso_shops
                (place_id, name, address, lat, lng, rating, rating_count,
                 smoking_status, positive_score, negative_score, summary, last_fetched_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(place_id) DO UPDATE SET
                name = excluded.name,
                address = excluded.address,
                lat = excluded.lat,
                lng = excluded.lng,
                rating = excluded.rating,
                rating_count = excluded.rating_count,
                smoking_status = excluded.smoking_status,
                positive_score = excluded.positive_score,
                negative_score = excluded.negative_score,
                summary = excluded.summary,
                last_fetched_at = excluded.last_fetched_at
             WHERE excluded.last_fetched_at >= jongso_shops.last_fetched_at",
            params![
                record.place_id,
                record.name,
                record.address,
                record.lat,
                record.lng,
                record.rating,
                record.rating_count,
                record.smoking_status.to_db_str(),
                record.positive_score,
                record.negative_score,
                record.summary,
                format_datetime(&record.last_fetched_at),
            ],
        )
        .context("Failed to upsert shop record")?;
        Ok(())
    }

    fn touch(&self, place_id: &str, at: DateTime<Utc>) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE jongso_shops
             SET last_fetched_at = max(last_fetched_at, ?2)
             WHERE place_id = ?1",
            params![place_id, format_datetime(&at)],
        )
        .context("Failed to touch shop record")?;
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM jongso_shops", [], |r| r.get(0))?;
        Ok(count as usize)
    }
}
