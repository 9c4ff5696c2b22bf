//! LLM-backed review classifier.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::llm::{CompletionOptions, LlmProvider, Message};
use crate::shop_store::SmokingStatus;

use super::parser::{combine_reviews, parse_sentiment_response, parse_smoking_answer};
use super::{ReviewClassifier, SentimentAnalysis};

const SENTIMENT_SYSTEM_PROMPT: &str = "You are an expert on mahjong parlors. \
You read customer reviews and produce a short summary and a sentiment score.";

const SMOKING_SYSTEM_PROMPT: &str = "You are an expert on mahjong parlors. \
You determine a parlor's smoking policy from customer reviews.";

fn sentiment_prompt(reviews_text: &str) -> String {
    format!(
        "Read the reviews below and respond in EXACTLY this format, one field per line:\n\
         \n\
         summary: <one or two sentences summarizing the reviews, in the reviews' language>\n\
         positive-degree: <integer from 0 to 10, digits only, no percent sign>\n\
         \n\
         Do not add any other lines.\n\
         \n\
         Reviews:\n\
         {}",
        reviews_text
    )
}

fn smoking_prompt(reviews_text: &str) -> String {
    format!(
        "Read the reviews below and classify the parlor's smoking policy. \
         Answer with exactly ONE of these options and nothing else:\n\
         \n\
         no-smoking\n\
         mixed\n\
         smoking-allowed\n\
         unknown\n\
         \n\
         Rules:\n\
         - Answer no-smoking only for clear statements that the whole venue is \
         non-smoking (fully no-smoking, all tables no-smoking).\n\
         - Answer mixed when a separate smoking room, smoking area or smoking \
         section is mentioned.\n\
         - Answer smoking-allowed when smoking at the tables is possible, or \
         when a review complains that the place smells of smoke or lets smoke \
         through DESPITE calling itself non-smoking. A complaint like that \
         overrides the non-smoking claim.\n\
         - If the reviews contain no smoking-related language at all, answer \
         unknown. The mere appearance of a smoking-related word without a \
         clear stance is NOT enough to pick a category; never guess.\n\
         \n\
         Reviews:\n\
         {}",
        reviews_text
    )
}

/// Classifier that runs both tasks against an LLM provider.
pub struct LlmReviewClassifier {
    llm: Arc<dyn LlmProvider>,
    options: CompletionOptions,
}

impl LlmReviewClassifier {
    pub fn new(llm: Arc<dyn LlmProvider>, options: CompletionOptions) -> Self {
        Self { llm, options }
    }
}

#[async_trait]
impl ReviewClassifier for LlmReviewClassifier {
    async fn analyze_sentiment(&self, reviews: &[String]) -> SentimentAnalysis {
        if reviews.is_empty() {
            return SentimentAnalysis::empty();
        }

        let combined = combine_reviews(reviews);
        let messages = [
            Message::system(SENTIMENT_SYSTEM_PROMPT),
            Message::user(sentiment_prompt(&combined)),
        ];

        match self.llm.complete(&messages, &self.options).await {
            Ok(text) => {
                let (summary, positive) = parse_sentiment_response(&text);
                if positive.is_none() {
                    warn!(
                        model = self.llm.model(),
                        "Sentiment response had no parseable positive-degree line"
                    );
                }
                match positive {
                    Some(p) => SentimentAnalysis::scored(p, summary),
                    None => SentimentAnalysis {
                        positive_score: None,
                        negative_score: None,
                        summary,
                    },
                }
            }
            Err(e) => {
                warn!(model = self.llm.model(), error = %e, "Sentiment analysis failed");
                SentimentAnalysis::unanalyzed()
            }
        }
    }

    async fn classify_smoking(&self, reviews: &[String]) -> SmokingStatus {
        if reviews.is_empty() {
            return SmokingStatus::Unknown;
        }

        let combined = combine_reviews(reviews);
        let messages = [
            Message::system(SMOKING_SYSTEM_PROMPT),
            Message::user(smoking_prompt(&combined)),
        ];

        match self.llm.complete(&messages, &self.options).await {
            Ok(text) => {
                let status = parse_smoking_answer(&text);
                if status == SmokingStatus::Unknown && !text.trim().is_empty() {
                    warn!(
                        model = self.llm.model(),
                        answer = text.trim(),
                        "Smoking answer outside the closed set, using unknown"
                    );
                }
                status
            }
            Err(e) => {
                warn!(model = self.llm.model(), error = %e, "Smoking classification failed");
                SmokingStatus::Unknown
            }
        }
    }
}
