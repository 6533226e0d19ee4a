use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
};
use hm_api::{config::Environment, router, state::ApiState};
use hm_srs::{FixedClock, FixedJitter, Scheduler};
use hm_store::{MemoryStore, RecordStore, ReviewRecord, VocabularyItem};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use serde_json::json;
use tower::ServiceExt;

/// Fixed start time for every test, 2023-11-14T22:13:20Z
pub const START: i64 = 1_700_000_000_000;

pub const MS_PER_DAY: i64 = 86_400_000;

/// Small vocabulary mixing numeric, text and missing ids
pub fn sample_vocabulary() -> Vec<VocabularyItem> {
    serde_json::from_value(json!([
        { "id": 1, "word_kr": "사과", "translation": "apple" },
        { "id": 2, "word_kr": "바다", "translation": "sea" },
        { "id": "w3", "word_kr": "나무", "translation": "tree" },
        { "word_kr": "하늘", "translation": "sky" },
        { "id": 5, "word_kr": "학교", "translation": "school" }
    ]))
    .expect("sample vocabulary is valid")
}

/// Builds an `ApiState` with a controllable clock and no interval fuzz
pub struct TestStateBuilder {
    items: Vec<VocabularyItem>,
    history: MemoryStore,
    queue_limit: Option<usize>,
}

impl TestStateBuilder {
    pub fn new() -> Self {
        Self {
            items: sample_vocabulary(),
            history: MemoryStore::new(),
            queue_limit: None,
        }
    }

    /// Mark `key` as seen once at `at`, without SM-2 scheduling
    pub fn seen(mut self, key: &str, at: i64) -> Self {
        self.history.save(key.into(), ReviewRecord::new(at));
        self
    }

    pub fn record(mut self, key: &str, record: ReviewRecord) -> Self {
        self.history.save(key.into(), record);
        self
    }

    pub fn queue_limit(mut self, limit: usize) -> Self {
        self.queue_limit = Some(limit);
        self
    }

    pub fn build(self) -> (ApiState, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::new(START));
        let mut scheduler = Scheduler::new(clock.clone(), Box::new(FixedJitter::NONE));
        if let Some(limit) = self.queue_limit {
            scheduler = scheduler.with_queue_limit(limit);
        }

        let mut history = self.history;
        history.drain_dirty();

        let state = ApiState::from_parts(self.items, history, scheduler, Environment::Development);
        (state, clock)
    }
}

impl Default for TestStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper to make requests to the test app
pub struct TestClient {
    router: Router,
}

impl TestClient {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    /// Client over the plain router for `state`
    pub fn for_state(state: ApiState) -> Self {
        Self::new(router::router().with_state(state))
    }

    /// Send a request and get the response
    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read response body")
            .to_bytes();

        TestResponse {
            status,
            body: body_bytes.to_vec(),
            headers,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send("GET", uri, None).await
    }

    pub async fn post(&self, uri: &str) -> TestResponse {
        self.send("POST", uri, None).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.send("DELETE", uri, None).await
    }

    pub async fn post_json<T: serde::Serialize>(&self, uri: &str, body: &T) -> TestResponse {
        self.send("POST", uri, Some(serde_json::to_string(body).expect("Failed to serialize body")))
            .await
    }

    pub async fn put_json<T: serde::Serialize>(&self, uri: &str, body: &T) -> TestResponse {
        self.send("PUT", uri, Some(serde_json::to_string(body).expect("Failed to serialize body")))
            .await
    }

    async fn send(&self, method: &str, uri: &str, body: Option<String>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json)),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        self.request(request).await
    }
}

/// Response captured from the test app
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    pub headers: HeaderMap,
}

impl TestResponse {
    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).unwrap_or_else(|e| {
            panic!(
                "Failed to parse JSON response: {e}\nBody: {}",
                String::from_utf8_lossy(&self.body)
            )
        })
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn assert_status(&self, expected: StatusCode) {
        assert_eq!(
            self.status,
            expected,
            "Unexpected status. Body: {}",
            self.text()
        );
    }
}
