//! End-to-end pipeline tests: search service + enrichment cache + LLM-backed
//! classifier + SQLite store, with scripted provider and LLM doubles.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tempfile::TempDir;

use jongso_server::analysis::LlmReviewClassifier;
use jongso_server::enrichment::EnrichmentCache;
use jongso_server::llm::{CompletionOptions, LlmError, LlmProvider, Message};
use jongso_server::places::{Coordinate, PlaceCandidate, PlaceProvider, ProviderError};
use jongso_server::search::{SearchError, SearchService};
use jongso_server::shop_store::{ShopStore, SmokingStatus, SqliteShopStore};

/// Maps provider double with fixed candidates and per-place reviews.
struct FixtureProvider {
    nearby: Vec<PlaceCandidate>,
    text_results: Vec<PlaceCandidate>,
    geocoded: Option<Coordinate>,
    reviews: HashMap<String, Vec<String>>,
    fail_nearby: bool,
    review_calls: AtomicUsize,
}

impl FixtureProvider {
    fn new() -> Self {
        Self {
            nearby: vec![],
            text_results: vec![],
            geocoded: None,
            reviews: HashMap::new(),
            fail_nearby: false,
            review_calls: AtomicUsize::new(0),
        }
    }

    fn with_nearby(mut self, candidates: Vec<PlaceCandidate>) -> Self {
        self.nearby = candidates;
        self
    }

    fn with_text_results(mut self, candidates: Vec<PlaceCandidate>) -> Self {
        self.text_results = candidates;
        self
    }

    fn with_geocode(mut self, coordinate: Coordinate) -> Self {
        self.geocoded = Some(coordinate);
        self
    }

    fn with_reviews(mut self, place_id: &str, texts: &[&str]) -> Self {
        self.reviews.insert(
            place_id.to_string(),
            texts.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    fn failing_nearby(mut self) -> Self {
        self.fail_nearby = true;
        self
    }
}

#[async_trait]
impl PlaceProvider for FixtureProvider {
    async fn nearby_search(
        &self,
        _center: Coordinate,
        _radius_m: u32,
        _keyword: &str,
    ) -> Result<Vec<PlaceCandidate>, ProviderError> {
        if self.fail_nearby {
            return Err(ProviderError::Api {
                status: "REQUEST_DENIED".to_string(),
                message: Some("invalid key".to_string()),
            });
        }
        Ok(self.nearby.clone())
    }

    async fn text_search(&self, _query: &str) -> Result<Vec<PlaceCandidate>, ProviderError> {
        Ok(self.text_results.clone())
    }

    async fn geocode(&self, _query: &str) -> Result<Option<Coordinate>, ProviderError> {
        Ok(self.geocoded)
    }

    async fn place_reviews(&self, place_id: &str) -> Result<Vec<String>, ProviderError> {
        self.review_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reviews.get(place_id).cloned().unwrap_or_default())
    }
}

/// LLM double that answers by prompt kind and counts calls per task.
struct FixtureLlm {
    sentiment_response: String,
    smoking_response: String,
    sentiment_calls: AtomicUsize,
    smoking_calls: AtomicUsize,
}

impl FixtureLlm {
    fn new(sentiment_response: &str, smoking_response: &str) -> Self {
        Self {
            sentiment_response: sentiment_response.to_string(),
            smoking_response: smoking_response.to_string(),
            sentiment_calls: AtomicUsize::new(0),
            smoking_calls: AtomicUsize::new(0),
        }
    }

    fn total_calls(&self) -> usize {
        self.sentiment_calls.load(Ordering::SeqCst) + self.smoking_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for FixtureLlm {
    fn name(&self) -> &str {
        "fixture"
    }

    fn model(&self) -> &str {
        "fixture-model"
    }

    async fn complete(
        &self,
        messages: &[Message],
        _options: &CompletionOptions,
    ) -> Result<String, LlmError> {
        let prompt = messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        if prompt.contains("positive-degree") {
            self.sentiment_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.sentiment_response.clone())
        } else {
            self.smoking_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.smoking_response.clone())
        }
    }
}

fn make_candidate(
    id: &str,
    lat: f64,
    lng: f64,
    rating: Option<f64>,
    count: Option<u32>,
) -> PlaceCandidate {
    PlaceCandidate {
        place_id: id.to_string(),
        name: format!("Parlor {}", id),
        address: format!("{} street", id),
        location: Coordinate { lat, lng },
        rating,
        rating_count: count,
    }
}

struct Pipeline {
    service: SearchService,
    provider: Arc<FixtureProvider>,
    llm: Arc<FixtureLlm>,
    store: Arc<SqliteShopStore>,
    _dir: TempDir,
}

fn make_pipeline(provider: FixtureProvider, llm: FixtureLlm) -> Pipeline {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(SqliteShopStore::new(dir.path().join("shops.db")).unwrap());
    let provider = Arc::new(provider);
    let llm = Arc::new(llm);

    let classifier = Arc::new(LlmReviewClassifier::new(
        llm.clone() as Arc<dyn LlmProvider>,
        CompletionOptions::default(),
    ));
    let cache = Arc::new(EnrichmentCache::new(
        store.clone() as Arc<dyn ShopStore>,
        provider.clone() as Arc<dyn PlaceProvider>,
        classifier,
        chrono::Duration::days(30),
        5,
    ));
    let service = SearchService::new(provider.clone() as Arc<dyn PlaceProvider>, cache);

    Pipeline {
        service,
        provider,
        llm,
        store,
        _dir: dir,
    }
}

async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(StdDuration::from_millis(5)).await;
    }
    panic!("condition not met within deadline");
}

#[tokio::test]
async fn location_search_enriches_ranks_and_persists() {
    let provider = FixtureProvider::new()
        .with_nearby(vec![
            make_candidate("alpha", 35.001, 139.0, Some(4.0), Some(30)),
            make_candidate("beta", 35.002, 139.0, Some(4.5), Some(10)),
        ])
        .with_reviews("alpha", &["quiet and clean", "good value"])
        .with_reviews("beta", &["excellent tables"]);
    let llm = FixtureLlm::new("summary: well liked\npositive-degree: 8", "no-smoking");
    let pipeline = make_pipeline(provider, llm);

    let results = pipeline.service.search_by_location(35.0, 139.0).await.unwrap();

    assert_eq!(results.len(), 2);
    // Same sentiment bonus on both, so base rating decides
    assert_eq!(results[0].id, "beta");
    assert_eq!(results[1].id, "alpha");

    for shop in &results {
        assert_eq!(shop.positive_score, Some(8));
        assert_eq!(shop.negative_score, Some(2));
        assert_eq!(shop.summary, Some("well liked".to_string()));
        assert_eq!(shop.smoking_status, SmokingStatus::NoSmoking);
        assert!(shop.distance_km.is_some());
        assert!(shop.walk_minutes.is_some());
    }

    // One sentiment and one smoking call per place
    assert_eq!(pipeline.llm.sentiment_calls.load(Ordering::SeqCst), 2);
    assert_eq!(pipeline.llm.smoking_calls.load(Ordering::SeqCst), 2);
    assert_eq!(pipeline.provider.review_calls.load(Ordering::SeqCst), 2);

    // Background writes land in the store
    wait_until(|| pipeline.store.count().unwrap() == 2).await;
}

#[tokio::test]
async fn second_search_reuses_cached_enrichment() {
    let provider = FixtureProvider::new()
        .with_nearby(vec![make_candidate("alpha", 35.001, 139.0, Some(4.0), Some(30))])
        .with_reviews("alpha", &["pleasant"]);
    let llm = FixtureLlm::new("summary: pleasant spot\npositive-degree: 7", "mixed");
    let pipeline = make_pipeline(provider, llm);

    let first = pipeline.service.search_by_location(35.0, 139.0).await.unwrap();
    wait_until(|| pipeline.store.count().unwrap() == 1).await;
    let calls_after_first = pipeline.llm.total_calls();

    let second = pipeline.service.search_by_location(35.0, 139.0).await.unwrap();

    // No re-classification within the freshness window
    assert_eq!(pipeline.llm.total_calls(), calls_after_first);
    assert_eq!(second[0].positive_score, first[0].positive_score);
    assert_eq!(second[0].summary, first[0].summary);
    assert_eq!(second[0].smoking_status, first[0].smoking_status);
}

#[tokio::test]
async fn keyword_search_geocode_hit_carries_distances() {
    let provider = FixtureProvider::new()
        .with_geocode(Coordinate { lat: 35.0, lng: 139.0 })
        .with_nearby(vec![make_candidate("alpha", 35.003, 139.0, Some(3.5), None)])
        .with_reviews("alpha", &["fine"]);
    let llm = FixtureLlm::new("summary: fine\npositive-degree: 5", "unknown");
    let pipeline = make_pipeline(provider, llm);

    let results = pipeline.service.search_by_keyword("kanda").await.unwrap();

    assert_eq!(results.len(), 1);
    assert!(results[0].distance_km.is_some());
    assert!(results[0].walk_minutes.is_some());
}

#[tokio::test]
async fn keyword_search_without_geocode_has_no_distances() {
    let provider = FixtureProvider::new()
        .with_text_results(vec![make_candidate("gamma", 35.0, 139.0, Some(4.2), Some(8))])
        .with_reviews("gamma", &["cozy"]);
    let llm = FixtureLlm::new("summary: cozy\npositive-degree: 6", "unknown");
    let pipeline = make_pipeline(provider, llm);

    let results = pipeline.service.search_by_keyword("dragon hall").await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "gamma");
    assert!(results[0].distance_km.is_none());
    assert!(results[0].walk_minutes.is_none());
}

#[tokio::test]
async fn place_without_reviews_degrades_without_llm_calls() {
    let provider = FixtureProvider::new()
        .with_nearby(vec![make_candidate("silent", 35.001, 139.0, Some(3.0), Some(2))]);
    let llm = FixtureLlm::new("summary: unused\npositive-degree: 9", "no-smoking");
    let pipeline = make_pipeline(provider, llm);

    let results = pipeline.service.search_by_location(35.0, 139.0).await.unwrap();

    assert_eq!(results.len(), 1);
    let shop = &results[0];
    assert_eq!(shop.positive_score, None);
    assert_eq!(shop.negative_score, None);
    assert_eq!(shop.summary, Some("no information".to_string()));
    assert_eq!(shop.smoking_status, SmokingStatus::Unknown);
    assert_eq!(pipeline.llm.total_calls(), 0);
}

#[tokio::test]
async fn provider_failure_is_surfaced_not_swallowed() {
    let provider = FixtureProvider::new().failing_nearby();
    let llm = FixtureLlm::new("summary: unused\npositive-degree: 9", "unknown");
    let pipeline = make_pipeline(provider, llm);

    let err = pipeline
        .service
        .search_by_location(35.0, 139.0)
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Provider(_)));
}

#[tokio::test]
async fn persisted_records_keep_sentiment_pair_invariant() {
    let provider = FixtureProvider::new()
        .with_nearby(vec![make_candidate("alpha", 35.001, 139.0, Some(4.0), Some(3))])
        .with_reviews("alpha", &["nice"]);
    let llm = FixtureLlm::new("summary: nice\npositive-degree: 4", "mixed");
    let pipeline = make_pipeline(provider, llm);

    pipeline.service.search_by_location(35.0, 139.0).await.unwrap();
    wait_until(|| pipeline.store.count().unwrap() == 1).await;

    let record = pipeline.store.get_by_place_id("alpha").unwrap().unwrap();
    let (positive, negative) = (
        record.positive_score.unwrap(),
        record.negative_score.unwrap(),
    );
    assert_eq!(positive + negative, 10);
    assert_eq!(record.smoking_status, SmokingStatus::Mixed);
}
