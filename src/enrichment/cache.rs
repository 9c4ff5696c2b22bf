//! Reuse-vs-recompute resolution of place enrichment.
//!
//! For every candidate the cache decides between three paths:
//!
//! - **fresh hit**: the stored record is younger than the freshness window;
//!   return it verbatim, schedule nothing.
//! - **stale hit**: return the stored analytical fields so the caller never
//!   waits on re-analysis, and schedule a background touch that only
//!   advances `last_fetched_at`. Staleness does not force recomputation.
//! - **miss**: fetch reviews, run the two classification tasks concurrently,
//!   return the new record and schedule a background insert.
//!
//! Background writes go through a fixed-capacity admission semaphore shared
//! across all in-flight writes, are never awaited by the caller, and are
//! never retried: a failed write is logged and dropped.

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::analysis::{ReviewClassifier, PENDING_SUMMARY};
use crate::places::{PlaceCandidate, PlaceProvider};
use crate::shop_store::{ShopRecord, ShopStore, SmokingStatus};

pub const DEFAULT_FRESHNESS_DAYS: i64 = 30;
pub const DEFAULT_WRITE_CONCURRENCY: usize = 5;

/// What the batched freshness prefetch knew about a candidate.
enum FreshnessHint {
    /// No batch lookup was performed for this resolution.
    Unchecked,
    /// The batch lookup saw no record for this place.
    Absent,
    /// The batch lookup saw a record with this fetch time.
    FetchedAt(DateTime<Utc>),
}

pub struct EnrichmentCache {
    store: Arc<dyn ShopStore>,
    provider: Arc<dyn PlaceProvider>,
    classifier: Arc<dyn ReviewClassifier>,
    freshness_window: Duration,
    /// Admission gate for background writes, shared process-wide.
    write_gate: Arc<Semaphore>,
}

impl EnrichmentCache {
    pub fn new(
        store: Arc<dyn ShopStore>,
        provider: Arc<dyn PlaceProvider>,
        classifier: Arc<dyn ReviewClassifier>,
        freshness_window: Duration,
        write_concurrency: usize,
    ) -> Self {
        Self {
            store,
            provider,
            classifier,
            freshness_window,
            write_gate: Arc::new(Semaphore::new(write_concurrency.max(1))),
        }
    }

    /// Resolve a whole candidate set concurrently.
    ///
    /// Reads `last_fetched_at` for every id in one round trip first, so
    /// known misses skip the per-place store lookup and known-fresh places
    /// schedule no write. Result order matches candidate order.
    pub async fn resolve_all(&self, candidates: &[PlaceCandidate]) -> Vec<ShopRecord> {
        let ids: Vec<String> = candidates.iter().map(|c| c.place_id.clone()).collect();
        let known = match self.store.get_last_fetched(&ids) {
            Ok(map) => Some(map),
            Err(e) => {
                warn!(error = %e, "Batched freshness read failed, falling back to point lookups");
                None
            }
        };

        let resolutions = candidates.iter().map(|candidate| {
            let hint = match &known {
                None => FreshnessHint::Unchecked,
                Some(map) => match map.get(&candidate.place_id) {
                    Some(at) => FreshnessHint::FetchedAt(*at),
                    None => FreshnessHint::Absent,
                },
            };
            self.resolve_with_hint(candidate, hint)
        });

        join_all(resolutions).await
    }

    /// Resolve a single candidate.
    pub async fn resolve(&self, candidate: &PlaceCandidate) -> ShopRecord {
        self.resolve_with_hint(candidate, FreshnessHint::Unchecked)
            .await
    }

    async fn resolve_with_hint(
        &self,
        candidate: &PlaceCandidate,
        hint: FreshnessHint,
    ) -> ShopRecord {
        let now = Utc::now();

        let stored = match hint {
            // Known miss, no point in another lookup
            FreshnessHint::Absent => None,
            FreshnessHint::Unchecked | FreshnessHint::FetchedAt(_) => {
                match self.store.get_by_place_id(&candidate.place_id) {
                    Ok(stored) => stored,
                    Err(e) => {
                        warn!(
                            place_id = %candidate.place_id,
                            error = %e,
                            "Store lookup failed, treating as cache miss"
                        );
                        None
                    }
                }
            }
        };

        if let Some(record) = stored {
            if now - record.last_fetched_at < self.freshness_window {
                debug!(place_id = %candidate.place_id, "Cache hit (fresh)");
                return record;
            }
            // Stale: the caller still gets the cached analysis immediately,
            // only the timestamp is refreshed in the background.
            debug!(place_id = %candidate.place_id, "Cache hit (stale), scheduling touch");
            self.schedule_touch(record.place_id.clone(), now);
            return record;
        }

        debug!(place_id = %candidate.place_id, "Cache miss, enriching");
        let record = self.enrich(candidate, now).await;
        self.schedule_upsert(record.clone());
        record
    }

    /// Full enrichment for a cache miss. Infallible: every external failure
    /// degrades to a partial record so one place can never fail a search.
    async fn enrich(&self, candidate: &PlaceCandidate, now: DateTime<Utc>) -> ShopRecord {
        let reviews = match self.provider.place_reviews(&candidate.place_id).await {
            Ok(reviews) => reviews,
            Err(e) => {
                warn!(
                    place_id = %candidate.place_id,
                    error = %e,
                    "Review fetch failed, producing partial record"
                );
                return ShopRecord::new(
                    candidate,
                    SmokingStatus::Unknown,
                    None,
                    Some(PENDING_SUMMARY.to_string()),
                    now,
                );
            }
        };

        // The two tasks are independent; run them concurrently. Each one
        // degrades internally, so a failure in one never cancels the other.
        let (sentiment, smoking) = tokio::join!(
            self.classifier.analyze_sentiment(&reviews),
            self.classifier.classify_smoking(&reviews),
        );

        let summary = sentiment
            .summary
            .or_else(|| Some(PENDING_SUMMARY.to_string()));
        ShopRecord::new(candidate, smoking, sentiment.positive_score, summary, now)
    }

    fn schedule_upsert(&self, record: ShopRecord) {
        let store = Arc::clone(&self.store);
        let gate = Arc::clone(&self.write_gate);
        tokio::spawn(async move {
            let _permit = match gate.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };
            if let Err(e) = store.upsert(&record) {
                warn!(place_id = %record.place_id, error = %e, "Background upsert failed");
            }
        });
    }

    fn schedule_touch(&self, place_id: String, at: DateTime<Utc>) {
        let store = Arc::clone(&self.store);
        let gate = Arc::clone(&self.write_gate);
        tokio::spawn(async move {
            let _permit = match gate.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return,
            };
            if let Err(e) = store.touch(&place_id, at) {
                warn!(place_id = %place_id, error = %e, "Background touch failed");
            }
        });
    }
}
