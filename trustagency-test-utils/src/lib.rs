//! TrustAgency Test Utilities
//!
//! Shared test infrastructure for the TrustAgency workspace:
//! - A scripted mock transport that records every attempt
//! - Gateway builders wired to the mock and an in-memory store
//! - Proptest generators for query parameters and domain values
//! - JSON fixtures shaped like backend responses
//! - Assertions for gateway error variants

pub use trustagency_client::{
    GatewayConfig, GatewayError, GatewayEvent, GatewayResult, HttpResponse, LogoutReason,
    MemoryStore, Method, Payload, RequestAttempt, RequestBody, RequestGateway, Transport,
    TransportError,
};
pub use trustagency_core::{QueryParams, QueryValue, TaskStatus};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

// ============================================================================
// MOCK TRANSPORT
// ============================================================================

/// What the mock does when a route is hit.
#[derive(Debug, Clone)]
pub enum MockReply {
    Respond {
        status: u16,
        content_type: Option<String>,
        body: Vec<u8>,
    },
    /// Fail like a refused connection.
    NetworkError(String),
    /// Never complete; only a gateway timeout ends the attempt.
    Hang,
}

/// A scripted reply with an optional delay before it is delivered.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub reply: MockReply,
    pub delay: Duration,
}

impl MockResponse {
    pub fn raw(status: u16, content_type: Option<&str>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            reply: MockReply::Respond {
                status,
                content_type: content_type.map(str::to_string),
                body: body.into(),
            },
            delay: Duration::ZERO,
        }
    }

    pub fn json(status: u16, value: Value) -> Self {
        Self::raw(status, Some("application/json"), value.to_string())
    }

    pub fn ok_json(value: Value) -> Self {
        Self::json(200, value)
    }

    pub fn text(status: u16, text: &str) -> Self {
        Self::raw(status, Some("text/plain; charset=utf-8"), text)
    }

    pub fn no_content() -> Self {
        Self::raw(204, None, Vec::new())
    }

    pub fn network_error(message: &str) -> Self {
        Self {
            reply: MockReply::NetworkError(message.to_string()),
            delay: Duration::ZERO,
        }
    }

    pub fn hang() -> Self {
        Self {
            reply: MockReply::Hang,
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Multipart body as seen by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedUpload {
    pub file_name: String,
    pub size: usize,
    pub fields: Vec<(String, String)>,
}

/// One attempt as received by the mock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: String,
    /// Path and query, without scheme and host.
    pub path: String,
    pub headers: HeaderMap,
    pub json: Option<Value>,
    pub upload: Option<RecordedUpload>,
    pub attempt: u32,
}

impl RecordedRequest {
    pub fn authorization(&self) -> Option<&str> {
        self.headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    pub fn path_only(&self) -> &str {
        self.path.split('?').next().unwrap_or(&self.path)
    }

    pub fn query(&self) -> Option<&str> {
        self.path.split_once('?').map(|(_, q)| q)
    }
}

/// Transport that answers from scripted routes and records every attempt.
///
/// Routes are keyed by method and path. A route with a query string only
/// matches that exact query; a route without one matches any query. Each
/// route holds a queue of replies; the last reply repeats once the queue
/// is down to one. Unrouted requests get a JSON 404.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<MockResponse>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Path and query of an absolute URL.
pub fn path_of(url: &str) -> String {
    let without_scheme = match url.split_once("://") {
        Some((_, rest)) => rest,
        None => return url.to_string(),
    };
    match without_scheme.find('/') {
        Some(idx) => without_scheme[idx..].to_string(),
        None => "/".to_string(),
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `response` for `method path`.
    pub fn on(&self, method: Method, path: &str, response: MockResponse) -> &Self {
        lock(&self.routes)
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    /// Attempts whose path (with or without query) equals `path`.
    pub fn count(&self, method: Method, path: &str) -> usize {
        lock(&self.requests)
            .iter()
            .filter(|r| r.method == method && (r.path == path || r.path_only() == path))
            .count()
    }

    pub fn total(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn last(&self) -> Option<RecordedRequest> {
        lock(&self.requests).last().cloned()
    }

    pub fn clear_requests(&self) {
        lock(&self.requests).clear();
    }

    fn next_response(&self, method: Method, path: &str) -> Option<MockResponse> {
        let mut routes = lock(&self.routes);
        let path_only = path.split('?').next().unwrap_or(path);
        let key = if routes.contains_key(&(method, path.to_string())) {
            (method, path.to_string())
        } else {
            (method, path_only.to_string())
        };
        let queue = routes.get_mut(&key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }

    fn record(&self, request: &RequestAttempt) -> String {
        let path = path_of(&request.url);
        let (json, upload) = match &request.body {
            RequestBody::Empty => (None, None),
            RequestBody::Json(value) => (Some(value.clone()), None),
            RequestBody::Multipart(form) => (
                None,
                Some(RecordedUpload {
                    file_name: form.file.file_name.clone(),
                    size: form.file.bytes.len(),
                    fields: form.fields.clone(),
                }),
            ),
        };
        lock(&self.requests).push(RecordedRequest {
            method: request.method,
            url: request.url.clone(),
            path: path.clone(),
            headers: request.headers.clone(),
            json,
            upload,
            attempt: request.attempt,
        });
        path
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: RequestAttempt) -> Result<HttpResponse, TransportError> {
        let path = self.record(&request);
        let scripted = self
            .next_response(request.method, &path)
            .unwrap_or_else(|| MockResponse::json(404, serde_json::json!({"detail": "Not Found"})));

        if !scripted.delay.is_zero() {
            tokio::time::sleep(scripted.delay).await;
        }

        match scripted.reply {
            MockReply::Respond {
                status,
                content_type,
                body,
            } => {
                if let RequestBody::Multipart(form) = &request.body {
                    if let Some(progress) = &form.progress {
                        for pct in [25.0, 50.0, 75.0, 100.0] {
                            progress(pct);
                        }
                    }
                }
                let mut headers = HeaderMap::new();
                if let Some(ct) = content_type {
                    if let Ok(value) = HeaderValue::from_str(&ct) {
                        headers.insert(CONTENT_TYPE, value);
                    }
                }
                Ok(HttpResponse {
                    status,
                    headers,
                    body,
                })
            }
            MockReply::NetworkError(message) => Err(TransportError::Connect(message)),
            MockReply::Hang => {
                std::future::pending::<()>().await;
                Err(TransportError::Connect("hang ended".to_string()))
            }
        }
    }
}

// ============================================================================
// GATEWAY BUILDERS
// ============================================================================

pub const TEST_BASE_URL: &str = "http://api.test";

/// Config with short delays and timeouts, TTL cache on.
pub fn test_config() -> GatewayConfig {
    GatewayConfig {
        base_url: TEST_BASE_URL.to_string(),
        timeout_ms: 1_000,
        retry_attempts: 3,
        retry_delay_ms: 100,
        cache_ttl_ms: 300_000,
        ..GatewayConfig::default()
    }
}

/// A gateway wired to a mock transport and an in-memory store, with
/// handles to both.
pub struct TestGateway {
    pub gateway: RequestGateway,
    pub transport: Arc<MockTransport>,
    pub store: Arc<MemoryStore>,
}

impl TestGateway {
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        let transport = Arc::new(MockTransport::new());
        let store = Arc::new(MemoryStore::new());
        let gateway = RequestGateway::builder(config)
            .transport(transport.clone())
            .store(store.clone())
            .build()?;
        Ok(Self {
            gateway,
            transport,
            store,
        })
    }
}

/// [`TestGateway`] with [`test_config`].
pub fn test_gateway() -> TestGateway {
    match TestGateway::new(test_config()) {
        Ok(gateway) => gateway,
        Err(err) => panic!("test config must build: {}", err),
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for gateway inputs.

    use super::*;
    use proptest::prelude::*;

    pub fn arb_query_value() -> impl Strategy<Value = QueryValue> {
        prop_oneof![
            Just(QueryValue::Null),
            any::<bool>().prop_map(QueryValue::Bool),
            (-1_000i64..1_000).prop_map(QueryValue::Int),
            "[a-zA-Z0-9 _-]{0,12}".prop_map(QueryValue::Str),
        ]
    }

    /// Parameters with unique keys `k0..kn`.
    pub fn arb_query_params() -> impl Strategy<Value = QueryParams> {
        proptest::collection::vec(arb_query_value(), 0..8).prop_map(|values| {
            values
                .into_iter()
                .enumerate()
                .map(|(i, v)| (format!("k{}", i), v))
                .collect()
        })
    }

    /// Relative endpoint paths like `/api/articles/12`.
    pub fn arb_endpoint() -> impl Strategy<Value = String> {
        (
            prop_oneof![
                Just("platforms"),
                Just("articles"),
                Just("sections"),
                Just("categories"),
                Just("tasks"),
            ],
            proptest::option::of(1i64..10_000),
        )
            .prop_map(|(resource, id)| match id {
                Some(id) => format!("/api/{}/{}", resource, id),
                None => format!("/api/{}", resource),
            })
    }

    pub fn arb_task_status() -> impl Strategy<Value = TaskStatus> {
        prop_oneof![
            Just(TaskStatus::Pending),
            Just(TaskStatus::Processing),
            Just(TaskStatus::Completed),
            Just(TaskStatus::Failed),
            Just(TaskStatus::Cancelled),
        ]
    }

    /// Status codes that are neither success nor 401.
    pub fn arb_http_error_status() -> impl Strategy<Value = u16> {
        prop_oneof![400u16..401, 402u16..500, 500u16..600]
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! JSON bodies shaped like backend responses.

    use serde_json::{json, Value};

    pub fn platform_json(id: i64, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "description": format!("{} trading platform", name),
            "rating": 4.5,
            "rank": id,
            "min_leverage": 1.0,
            "max_leverage": 500.0,
            "commission_rate": 0.001,
            "is_regulated": true,
            "is_featured": false,
            "is_active": true,
            "created_at": "2025-11-01T08:00:00",
            "updated_at": "2025-11-12T15:30:00",
        })
    }

    pub fn article_json(id: i64, title: &str) -> Value {
        json!({
            "id": id,
            "title": title,
            "slug": title.to_lowercase().replace(' ', "-"),
            "content": "<p>content</p>",
            "summary": null,
            "section_id": 1,
            "category_id": 2,
            "tags": "guide,forex",
            "is_published": true,
            "is_featured": false,
            "view_count": 12,
            "like_count": 3,
            "created_at": "2025-11-01T10:00:00",
            "published_at": "2025-11-02T10:00:00Z",
        })
    }

    pub fn section_json(id: i64, slug: &str) -> Value {
        json!({
            "id": id,
            "name": slug.to_uppercase(),
            "slug": slug,
            "description": null,
            "requires_platform": false,
            "sort_order": id,
            "is_active": true,
        })
    }

    pub fn category_json(id: i64, section_id: i64, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "section_id": section_id,
            "sort_order": 0,
            "is_active": true,
        })
    }

    pub fn task_json(task_id: &str, status: &str) -> Value {
        json!({
            "task_id": task_id,
            "batch_name": "batch",
            "status": status,
            "progress": 40,
            "total_count": 5,
            "completed_count": 2,
            "celery_status": "PROGRESS",
            "created_at": "2025-11-01T10:00:00",
            "updated_at": null,
        })
    }

    pub fn admin_user_json(id: i64, username: &str, superadmin: bool) -> Value {
        json!({
            "id": id,
            "username": username,
            "email": format!("{}@trustagency.info", username),
            "full_name": null,
            "is_active": true,
            "is_superadmin": superadmin,
            "created_at": "2025-10-01T00:00:00",
        })
    }

    pub fn login_json(access_token: &str, refresh_token: Option<&str>, username: &str) -> Value {
        json!({
            "access_token": access_token,
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": refresh_token,
            "user": admin_user_json(1, username, true),
        })
    }

    /// `{data, total, skip, limit}` list envelope.
    pub fn data_page(items: Vec<Value>, total: u64) -> Value {
        let limit = items.len();
        json!({"data": items, "total": total, "skip": 0, "limit": limit})
    }

    /// `{items, total, skip, limit}` list envelope.
    pub fn items_page(items: Vec<Value>, total: u64) -> Value {
        let limit = items.len();
        json!({"items": items, "total": total, "skip": 0, "limit": limit})
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for gateway results.

    use super::*;

    #[track_caller]
    pub fn assert_http_status<T: std::fmt::Debug>(result: &GatewayResult<T>, expected: u16) {
        match result {
            Err(GatewayError::Http { status, .. }) => {
                assert_eq!(*status, expected, "Wrong HTTP status")
            }
            other => panic!("Expected HTTP {} error, got: {:?}", expected, other),
        }
    }

    #[track_caller]
    pub fn assert_unauthorized<T: std::fmt::Debug>(result: &GatewayResult<T>, refreshed: bool) {
        match result {
            Err(GatewayError::Unauthorized { refreshed: r, .. }) => {
                assert_eq!(*r, refreshed, "Wrong refreshed flag")
            }
            other => panic!("Expected Unauthorized error, got: {:?}", other),
        }
    }

    #[track_caller]
    pub fn assert_network_error<T: std::fmt::Debug>(result: &GatewayResult<T>) {
        match result {
            Err(GatewayError::Network(_)) => {}
            other => panic!("Expected Network error, got: {:?}", other),
        }
    }

    #[track_caller]
    pub fn assert_timeout<T: std::fmt::Debug>(result: &GatewayResult<T>) {
        match result {
            Err(GatewayError::Timeout { .. }) => {}
            other => panic!("Expected Timeout error, got: {:?}", other),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn attempt(method: Method, url: &str) -> RequestAttempt {
        RequestAttempt {
            method,
            url: url.to_string(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
            attempt: 1,
        }
    }

    #[test]
    fn path_of_strips_origin() {
        assert_eq!(path_of("http://api.test/api/x?a=1"), "/api/x?a=1");
        assert_eq!(path_of("https://api.test"), "/");
        assert_eq!(path_of("/relative"), "/relative");
    }

    #[tokio::test]
    async fn queued_replies_then_sticky_last() {
        let mock = MockTransport::new();
        mock.on(Method::Get, "/a", MockResponse::network_error("down"))
            .on(Method::Get, "/a", MockResponse::ok_json(json!({"ok": true})));

        assert!(mock.send(attempt(Method::Get, "http://api.test/a")).await.is_err());
        let second = mock.send(attempt(Method::Get, "http://api.test/a")).await.unwrap();
        let third = mock.send(attempt(Method::Get, "http://api.test/a?x=1")).await.unwrap();
        assert_eq!(second.status, 200);
        assert_eq!(third.status, 200);
        assert_eq!(mock.count(Method::Get, "/a"), 3);
        assert_eq!(mock.count(Method::Get, "/a?x=1"), 1);
    }

    #[tokio::test]
    async fn unrouted_is_404() {
        let mock = MockTransport::new();
        let response = mock.send(attempt(Method::Delete, "http://api.test/nope")).await.unwrap();
        assert_eq!(response.status, 404);
        assert_eq!(mock.last().unwrap().method, Method::Delete);
    }

    #[test]
    fn test_gateway_builds() {
        let harness = test_gateway();
        assert_eq!(harness.gateway.base_url(), TEST_BASE_URL);
        assert_eq!(harness.transport.total(), 0);
    }

    #[test]
    fn fixtures_decode_into_models() {
        let platform: trustagency_core::Platform =
            serde_json::from_value(fixtures::platform_json(1, "Alpha")).unwrap();
        assert_eq!(platform.name, "Alpha");
        let article: trustagency_core::Article =
            serde_json::from_value(fixtures::article_json(2, "Leverage Basics")).unwrap();
        assert_eq!(article.slug, "leverage-basics");
        let task: trustagency_core::AiTask =
            serde_json::from_value(fixtures::task_json("batch-1", "processing")).unwrap();
        assert_eq!(task.status, TaskStatus::Processing);
    }

    proptest! {
        #[test]
        fn generated_endpoints_are_relative(endpoint in generators::arb_endpoint()) {
            prop_assert!(endpoint.starts_with("/api/"));
        }

        #[test]
        fn generated_error_statuses_skip_401(status in generators::arb_http_error_status()) {
            prop_assert!(status != 401 && status >= 400);
        }
    }
}
