//! Review classification: sentiment scoring and smoking-policy detection.
//!
//! `ReviewClassifier` is the capability seam the enrichment cache depends
//! on; `LlmReviewClassifier` is the real implementation over an LLM
//! provider. Both classification tasks are infallible by construction:
//! every model failure degrades to the task's default outcome inside the
//! implementation, so a broken sentiment call can never take the smoking
//! call down with it (or vice versa).

mod classifier;
mod parser;

pub use classifier::LlmReviewClassifier;
pub use parser::{parse_sentiment_response, parse_smoking_answer};

use async_trait::async_trait;

use crate::shop_store::SmokingStatus;

/// Summary used when a place has no reviews to analyze.
pub const NO_REVIEWS_SUMMARY: &str = "no information";

/// Summary used when analysis failed or has not run yet.
pub const PENDING_SUMMARY: &str = "analysis pending";

/// Outcome of the sentiment task.
///
/// Scores are on a 0-10 scale; the pair is either fully present or fully
/// absent, and `negative` is always derived as `10 - positive`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SentimentAnalysis {
    pub positive_score: Option<u8>,
    pub negative_score: Option<u8>,
    pub summary: Option<String>,
}

impl SentimentAnalysis {
    /// Sentiment for a place with no reviews. No scores, fixed summary.
    pub fn empty() -> Self {
        Self {
            positive_score: None,
            negative_score: None,
            summary: Some(NO_REVIEWS_SUMMARY.to_string()),
        }
    }

    /// Sentiment when the model call failed or produced nothing usable.
    pub fn unanalyzed() -> Self {
        Self::default()
    }

    /// Build from a parsed positive score, deriving the complement.
    pub fn scored(positive: u8, summary: Option<String>) -> Self {
        let positive = positive.min(10);
        Self {
            positive_score: Some(positive),
            negative_score: Some(10 - positive),
            summary,
        }
    }
}

/// Capability interface for review analysis.
#[async_trait]
pub trait ReviewClassifier: Send + Sync {
    /// Score overall sentiment and produce a prose summary.
    async fn analyze_sentiment(&self, reviews: &[String]) -> SentimentAnalysis;

    /// Classify the smoking policy evidenced by the reviews.
    async fn classify_smoking(&self, reviews: &[String]) -> SmokingStatus;
}
