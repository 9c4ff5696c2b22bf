//! Parsing of classifier model output.
//!
//! The prompts demand a fixed line-oriented format; models do not always
//! comply. Parsing never fails: a line that is missing or malformed leaves
//! its field at the default, and an out-of-set smoking answer maps to
//! `Unknown`.

use crate::shop_store::SmokingStatus;

pub(crate) const SUMMARY_LABEL: &str = "summary:";
pub(crate) const POSITIVE_LABEL: &str = "positive-degree:";

/// Maximum combined review text sent in one prompt.
pub(crate) const COMBINED_REVIEWS_MAX_CHARS: usize = 3000;

/// Maximum length of a single review inside a batch.
pub(crate) const REVIEW_SNIPPET_MAX_CHARS: usize = 300;

/// Char-boundary-safe prefix cut. Not semantic, just a cost bound.
pub(crate) fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &s[..byte_index],
        None => s,
    }
}

/// Join reviews for a prompt: each review cut to a snippet, newline-joined,
/// whole text bounded.
pub(crate) fn combine_reviews(reviews: &[String]) -> String {
    let combined = reviews
        .iter()
        .map(|r| truncate_chars(r, REVIEW_SNIPPET_MAX_CHARS))
        .collect::<Vec<_>>()
        .join("\n");
    truncate_chars(&combined, COMBINED_REVIEWS_MAX_CHARS).to_string()
}

/// Extract the value following a labeled line, matching the label
/// case-insensitively at the start of the trimmed line.
fn labeled_value<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let trimmed = line.trim();
    // `get` also rejects a split that falls inside a multi-byte character
    let head = trimmed.get(..label.len())?;
    if head.eq_ignore_ascii_case(label) {
        Some(trimmed[label.len()..].trim())
    } else {
        None
    }
}

/// Parse a sentiment response into `(summary, positive_score)`.
///
/// Scans the response for a `summary:` line and a `positive-degree:` line.
/// The score must parse as an integer in 0-10; the prompt forbids a percent
/// sign but a stray trailing one is tolerated and stripped. Anything else
/// leaves the field `None`.
pub fn parse_sentiment_response(text: &str) -> (Option<String>, Option<u8>) {
    let mut summary = None;
    let mut positive = None;

    for line in text.lines() {
        if summary.is_none() {
            if let Some(value) = labeled_value(line, SUMMARY_LABEL) {
                if !value.is_empty() {
                    summary = Some(value.to_string());
                }
            }
        }
        if positive.is_none() {
            if let Some(value) = labeled_value(line, POSITIVE_LABEL) {
                positive = value
                    .trim_end_matches('%')
                    .trim()
                    .parse::<u8>()
                    .ok()
                    .filter(|v| *v <= 10);
            }
        }
    }

    (summary, positive)
}

/// Validate a smoking classification answer against the closed set.
///
/// The prompt instructs the model to answer with exactly one option; the
/// first non-empty line is matched case-insensitively, tolerating a
/// trailing period. Any other output, including explanations, maps to
/// `Unknown`.
pub fn parse_smoking_answer(text: &str) -> SmokingStatus {
    let answer = match text.lines().map(str::trim).find(|l| !l.is_empty()) {
        Some(line) => line.trim_end_matches('.').trim().to_ascii_lowercase(),
        None => return SmokingStatus::Unknown,
    };

    match answer.as_str() {
        "no-smoking" => SmokingStatus::NoSmoking,
        "mixed" => SmokingStatus::Mixed,
        "smoking-allowed" => SmokingStatus::SmokingAllowed,
        "unknown" => SmokingStatus::Unknown,
        _ => SmokingStatus::Unknown,
    }
}
