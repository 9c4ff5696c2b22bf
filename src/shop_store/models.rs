//! Persisted models for enriched mahjong parlor records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::places::PlaceCandidate;

/// Smoking policy of a parlor, derived from review text.
///
/// Closed enumeration: anything the classifier produces outside this set is
/// mapped to `Unknown` at the parsing boundary, and any unrecognized value
/// read back from the database is mapped to `Unknown` as well.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmokingStatus {
    NoSmoking,
    Mixed,
    SmokingAllowed,
    Unknown,
}

impl SmokingStatus {
    /// Convert from database string representation.
    pub fn from_db_str(s: &str) -> Self {
        match s {
            "no_smoking" => SmokingStatus::NoSmoking,
            "mixed" => SmokingStatus::Mixed,
            "smoking_allowed" => SmokingStatus::SmokingAllowed,
            _ => SmokingStatus::Unknown,
        }
    }

    /// Convert to database string representation.
    pub fn to_db_str(&self) -> &'static str {
        match self {
            SmokingStatus::NoSmoking => "no_smoking",
            SmokingStatus::Mixed => "mixed",
            SmokingStatus::SmokingAllowed => "smoking_allowed",
            SmokingStatus::Unknown => "unknown",
        }
    }
}

impl Default for SmokingStatus {
    fn default() -> Self {
        SmokingStatus::Unknown
    }
}

/// One enriched parlor, keyed by its external place id.
///
/// The sentiment pair is either fully present or fully absent; when present
/// the scores are on a 0-10 scale and sum to exactly 10.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShopRecord {
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub rating: Option<f64>,
    pub rating_count: Option<u32>,
    pub smoking_status: SmokingStatus,
    pub positive_score: Option<u8>,
    pub negative_score: Option<u8>,
    pub summary: Option<String>,
    pub last_fetched_at: DateTime<Utc>,
}

impl ShopRecord {
    /// Build a record from a place candidate plus analysis outcome.
    ///
    /// The sentiment pair is normalized here: a positive score is clamped to
    /// 0-10 and the negative score is always derived as its complement, so a
    /// stored pair can never be partial or inconsistent.
    pub fn new(
        candidate: &PlaceCandidate,
        smoking_status: SmokingStatus,
        positive_score: Option<u8>,
        summary: Option<String>,
        last_fetched_at: DateTime<Utc>,
    ) -> Self {
        let positive_score = positive_score.map(|p| p.min(10));
        let negative_score = positive_score.map(|p| 10 - p);
        ShopRecord {
            place_id: candidate.place_id.clone(),
            name: candidate.name.clone(),
            address: candidate.address.clone(),
            lat: candidate.location.lat,
            lng: candidate.location.lng,
            rating: candidate.rating,
            rating_count: candidate.rating_count,
            smoking_status,
            positive_score,
            negative_score,
            summary,
            last_fetched_at,
        }
    }

    /// True if the record carries a sentiment pair.
    pub fn has_sentiment(&self) -> bool {
        self.positive_score.is_some() && self.negative_score.is_some()
    }
}
