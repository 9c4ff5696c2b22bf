//! Result ordering.
//!
//! Results are ranked by an adjusted rating: the provider's base rating plus
//! a small bonus from positive sentiment, descending, with rating count as
//! tiebreak. Unrated places take a sentinel adjusted rating of 0.0, so they
//! tie with rated-zero places and sort after anything with a real rating.

use std::cmp::Ordering;

use super::EnrichedShop;

const UNRATED_ADJUSTED_RATING: f64 = 0.0;

/// Base rating plus sentiment bonus. A fully positive place (10/10) gains
/// up to one rating point.
pub fn adjusted_rating(rating: Option<f64>, positive_score: Option<u8>) -> f64 {
    let Some(base) = rating else {
        return UNRATED_ADJUSTED_RATING;
    };
    match positive_score {
        Some(positive) => base + f64::from(positive) / 10.0,
        None => base,
    }
}

/// Sort results in final response order. Stable, applied once after all
/// enrichment has completed.
pub fn sort_results(results: &mut [EnrichedShop]) {
    results.sort_by(|a, b| {
        let rating_a = adjusted_rating(a.rating, a.positive_score);
        let rating_b = adjusted_rating(b.rating, b.positive_score);
        rating_b
            .partial_cmp(&rating_a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.user_ratings_total
                    .unwrap_or(0)
                    .cmp(&a.user_ratings_total.unwrap_or(0))
            })
    });
}
