//! The request gateway.
//!
//! Every backend call goes through [`RequestGateway::request`], which
//! applies, in order: TTL cache lookup and in-flight de-duplication
//! (GET only), bearer token injection, a bounded retry loop with
//! exponential backoff around a per-attempt timeout, and 401 handling
//! (one refresh attempt, otherwise logout).

use crate::cache::{cache_key, ResponseCache};
use crate::config::GatewayConfig;
use crate::credentials::{CredentialStore, DEFAULT_TOKEN_LIFETIME_SECS};
use crate::error::{GatewayError, GatewayResult};
use crate::events::{EventBus, GatewayEvent, LogoutReason};
use crate::inflight::InFlightRequests;
use crate::response::{http_error, parse_success, Payload};
use crate::storage::{KeyValueStore, MemoryStore};
use crate::transport::{
    HttpResponse, Method, ProgressFn, ReqwestTransport, RequestAttempt, RequestBody, Transport,
    UploadFile, UploadForm,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};
use trustagency_core::{EndpointContract, Envelope, ListShape, Page, QueryParams, TokenRefresh};

/// Per-call options for [`RequestGateway::request`].
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// JSON payload, sent only for POST, PUT and PATCH.
    pub data: Option<Value>,
    pub params: Option<QueryParams>,
    /// Caller headers. A caller `Authorization` header wins over the
    /// injected bearer token.
    pub headers: HeaderMap,
    /// GET only: bypass the cache lookup and in-flight de-duplication.
    pub skip_cache: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Serialize `body` as the JSON payload.
    pub fn with_json<B: Serialize + ?Sized>(self, body: &B) -> GatewayResult<Self> {
        let data = serde_json::to_value(body)?;
        Ok(self.with_data(data))
    }

    pub fn with_params(mut self, params: QueryParams) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn skip_cache(mut self) -> Self {
        self.skip_cache = true;
        self
    }
}

/// Cloneable handle to a shared gateway. Construct once, pass around.
#[derive(Clone)]
pub struct RequestGateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    config: GatewayConfig,
    base_url: String,
    transport: Arc<dyn Transport>,
    credentials: CredentialStore,
    cache: ResponseCache,
    inflight: InFlightRequests,
    events: EventBus,
}

impl std::fmt::Debug for RequestGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestGateway")
            .field("base_url", &self.inner.base_url)
            .field("cached", &self.inner.cache.len())
            .field("in_flight", &self.inner.inflight.len())
            .finish()
    }
}

/// Builder for [`RequestGateway`]; defaults to the reqwest transport and
/// an in-memory store.
pub struct GatewayBuilder {
    config: GatewayConfig,
    transport: Option<Arc<dyn Transport>>,
    store: Option<Arc<dyn KeyValueStore>>,
}

impl GatewayBuilder {
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> GatewayResult<RequestGateway> {
        self.config.validate()?;
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };
        let store = self.store.unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let base_url = self.config.normalized_base_url().to_string();
        let inner = GatewayInner {
            base_url,
            transport,
            credentials: CredentialStore::new(store),
            cache: ResponseCache::new(self.config.cache_ttl()),
            inflight: InFlightRequests::new(),
            events: EventBus::new(self.config.event_capacity),
            config: self.config,
        };
        Ok(RequestGateway {
            inner: Arc::new(inner),
        })
    }
}

impl RequestGateway {
    pub fn builder(config: GatewayConfig) -> GatewayBuilder {
        GatewayBuilder {
            config,
            transport: None,
            store: None,
        }
    }

    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        Self::builder(config).build()
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.inner.credentials
    }

    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.inner.events.subscribe()
    }

    /// Absolute URL for `endpoint` with `params` appended.
    pub fn build_url(&self, endpoint: &str, params: Option<&QueryParams>) -> String {
        self.inner.build_url(endpoint, params)
    }

    /// Store or (with `None`) remove the access token.
    pub fn set_token(&self, token: Option<&str>) -> GatewayResult<()> {
        Ok(self.inner.credentials.set_token(token)?)
    }

    pub fn token(&self) -> GatewayResult<Option<String>> {
        Ok(self.inner.credentials.access_token()?)
    }

    /// Number of GETs currently shared through de-duplication.
    pub fn in_flight(&self) -> usize {
        self.inner.inflight.len()
    }

    pub fn clear_cache(&self) {
        debug!(entries = self.inner.cache.len(), "Clearing response cache");
        self.inner.cache.clear();
    }

    /// Issue one logical call with caching, de-duplication, retry, timeout
    /// and auth applied.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        options: RequestOptions,
    ) -> GatewayResult<Payload> {
        if method != Method::Get || options.skip_cache {
            return self.inner.execute(method, endpoint, options).await;
        }

        let key = cache_key(method.as_str(), endpoint);
        if let Some(hit) = self.inner.cache.get(&key) {
            debug!(key = %key, "Cache hit");
            return Ok(hit);
        }

        let inner = Arc::clone(&self.inner);
        let owned_endpoint = endpoint.to_string();
        let (pending, started) = self.inner.inflight.join_or_start(&key, move || async move {
            inner.execute(method, &owned_endpoint, options).await
        });
        if !started {
            debug!(key = %key, "Joining in-flight request");
        }
        pending.await
    }

    pub async fn get(&self, endpoint: &str, params: Option<QueryParams>) -> GatewayResult<Payload> {
        let options = RequestOptions {
            params,
            ..RequestOptions::default()
        };
        self.request(Method::Get, endpoint, options).await
    }

    pub async fn post(&self, endpoint: &str, data: Option<Value>) -> GatewayResult<Payload> {
        let options = RequestOptions {
            data,
            ..RequestOptions::default()
        };
        self.request(Method::Post, endpoint, options).await
    }

    pub async fn put(&self, endpoint: &str, data: Option<Value>) -> GatewayResult<Payload> {
        let options = RequestOptions {
            data,
            ..RequestOptions::default()
        };
        self.request(Method::Put, endpoint, options).await
    }

    pub async fn patch(&self, endpoint: &str, data: Option<Value>) -> GatewayResult<Payload> {
        let options = RequestOptions {
            data,
            ..RequestOptions::default()
        };
        self.request(Method::Patch, endpoint, options).await
    }

    pub async fn delete(&self, endpoint: &str) -> GatewayResult<Payload> {
        self.request(Method::Delete, endpoint, RequestOptions::default())
            .await
    }

    /// Upload `file` as multipart form data with extra text `fields`.
    ///
    /// Not cached, not de-duplicated and not retried. The timeout and 401
    /// handling apply. `progress` receives the percentage sent.
    pub async fn upload(
        &self,
        endpoint: &str,
        file: UploadFile,
        fields: Vec<(String, String)>,
        progress: Option<ProgressFn>,
    ) -> GatewayResult<Payload> {
        self.inner.upload(endpoint, file, fields, progress).await
    }

    // ------------------------------------------------------------------------
    // Typed helpers
    // ------------------------------------------------------------------------

    /// Issue a call and map the body onto `T`.
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        options: RequestOptions,
    ) -> GatewayResult<T> {
        self.request(method, endpoint, options).await?.decode()
    }

    /// GET a list endpoint whose wire layout is `shape`.
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        shape: ListShape,
        options: RequestOptions,
    ) -> GatewayResult<Page<T>> {
        let value = payload_value(self.request(Method::Get, endpoint, options).await?)?;
        Ok(Page::decode(value, shape)?)
    }

    pub async fn fetch_envelope<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        contract: EndpointContract,
        options: RequestOptions,
    ) -> GatewayResult<Envelope<T>> {
        let value = payload_value(self.request(method, endpoint, options).await?)?;
        Ok(Envelope::decode(value, contract)?)
    }

    /// Clear credentials and the cache, then announce the logout.
    pub(crate) fn end_session(&self, reason: LogoutReason) {
        self.inner.end_session(reason);
    }
}

fn payload_value(payload: Payload) -> GatewayResult<Value> {
    match payload {
        Payload::Json(value) => Ok(value),
        Payload::Empty => Ok(Value::Null),
        Payload::Text(_) => Err(GatewayError::Decode(
            "expected a JSON body, got text".to_string(),
        )),
    }
}

impl GatewayInner {
    fn build_url(&self, endpoint: &str, params: Option<&QueryParams>) -> String {
        let endpoint = match params {
            Some(params) => params.append_to(endpoint),
            None => endpoint.to_string(),
        };
        if endpoint.starts_with("http://")
            || endpoint.starts_with("https://")
            || endpoint.starts_with(&self.base_url)
        {
            return endpoint;
        }
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }

    fn prepare_headers(&self, mut headers: HeaderMap, exempt: bool) -> GatewayResult<HeaderMap> {
        if exempt || headers.contains_key(AUTHORIZATION) {
            return Ok(headers);
        }
        if let Some(token) = self.credentials.access_token()? {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| GatewayError::Config(format!("invalid access token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        options: RequestOptions,
    ) -> GatewayResult<Payload> {
        let exempt = self.config.is_auth_exempt(endpoint);
        let url = self.build_url(endpoint, options.params.as_ref());
        let headers = self.prepare_headers(options.headers, exempt)?;
        let body = match options.data {
            Some(data) if method.carries_body() => RequestBody::Json(data),
            _ => RequestBody::Empty,
        };

        let attempts = self.config.retry_attempts.max(1);
        let mut attempt = 0u32;
        loop {
            let request = RequestAttempt {
                method,
                url: url.clone(),
                headers: headers.clone(),
                body: body.clone(),
                attempt: attempt + 1,
            };
            debug!(%method, %url, attempt = attempt + 1, "Sending request");
            match self.send_once(request).await {
                Ok(response) => return self.handle_response(method, endpoint, response, exempt).await,
                Err(err) if err.is_retryable() && attempt + 1 < attempts => {
                    let delay = self.config.backoff_delay(attempt);
                    warn!(
                        %method,
                        %url,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Retrying request"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    debug!(%method, %url, attempt = attempt + 1, error = %err, "Request failed");
                    return Err(err);
                }
            }
        }
    }

    async fn upload(
        &self,
        endpoint: &str,
        file: UploadFile,
        fields: Vec<(String, String)>,
        progress: Option<ProgressFn>,
    ) -> GatewayResult<Payload> {
        let exempt = self.config.is_auth_exempt(endpoint);
        let url = self.build_url(endpoint, None);
        let headers = self.prepare_headers(HeaderMap::new(), exempt)?;
        debug!(%url, file = %file.file_name, size = file.bytes.len(), "Uploading file");
        let request = RequestAttempt {
            method: Method::Post,
            url,
            headers,
            body: RequestBody::Multipart(UploadForm {
                file,
                fields,
                progress,
            }),
            attempt: 1,
        };
        let response = self.send_once(request).await?;
        self.handle_response(Method::Post, endpoint, response, exempt)
            .await
    }

    /// One attempt bounded by the configured timeout. An elapsed timeout
    /// drops the transport future, aborting the attempt.
    async fn send_once(&self, request: RequestAttempt) -> GatewayResult<HttpResponse> {
        match tokio::time::timeout(self.config.timeout(), self.transport.send(request)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(GatewayError::Timeout {
                timeout_ms: self.config.timeout_ms,
            }),
        }
    }

    async fn handle_response(
        &self,
        method: Method,
        endpoint: &str,
        response: HttpResponse,
        exempt: bool,
    ) -> GatewayResult<Payload> {
        if response.is_success() {
            let payload = parse_success(&response);
            debug!(%method, endpoint, status = response.status, "Response success");
            if method == Method::Get {
                self.cache
                    .insert(&cache_key(method.as_str(), endpoint), payload.clone());
            }
            return Ok(payload);
        }

        let err = http_error(&response);
        if response.status == 401 && !exempt {
            let message = match &err {
                GatewayError::Http { message, .. } => message.clone(),
                other => other.to_string(),
            };
            return Err(self.handle_unauthorized(message).await);
        }
        debug!(%method, endpoint, status = response.status, "Response error");
        Err(err)
    }

    async fn handle_unauthorized(&self, message: String) -> GatewayError {
        let refresh_token = match self.credentials.refresh_token() {
            Ok(token) => token,
            Err(err) => {
                warn!(error = %err, "Could not read refresh token");
                None
            }
        };

        let Some(refresh_token) = refresh_token else {
            warn!("Unauthorized with no refresh token; logging out");
            self.end_session(LogoutReason::Expired);
            return GatewayError::Unauthorized {
                refreshed: false,
                message,
            };
        };

        match self.refresh_access_token(&refresh_token).await {
            Ok(()) => {
                debug!("Access token refreshed after 401");
                GatewayError::Unauthorized {
                    refreshed: true,
                    message,
                }
            }
            Err(err) => {
                warn!(error = %err, "Token refresh failed; logging out");
                self.end_session(LogoutReason::RefreshFailed);
                GatewayError::Unauthorized {
                    refreshed: false,
                    message,
                }
            }
        }
    }

    /// Single-attempt refresh call. Never re-enters 401 handling.
    async fn refresh_access_token(&self, refresh_token: &str) -> GatewayResult<()> {
        let request = RequestAttempt {
            method: Method::Post,
            url: self.build_url(&self.config.refresh_path, None),
            headers: HeaderMap::new(),
            body: RequestBody::Json(json!({ "refresh_token": refresh_token })),
            attempt: 1,
        };
        let response = self.send_once(request).await?;
        if !response.is_success() {
            return Err(http_error(&response));
        }
        let refreshed: TokenRefresh = parse_success(&response).decode()?;
        self.credentials.set_token_with_expiry(
            &refreshed.access_token,
            refreshed.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS),
        )?;
        if let Some(rotated) = refreshed.refresh_token.as_deref() {
            self.credentials.set_refresh_token(Some(rotated))?;
        }
        Ok(())
    }

    fn end_session(&self, reason: LogoutReason) {
        if let Err(err) = self.credentials.clear() {
            warn!(error = %err, "Failed to clear stored credentials");
        }
        self.cache.clear();
        self.events.emit(GatewayEvent::AuthLogout { reason });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::transport::TransportError;

    struct NoTransport;

    #[async_trait]
    impl Transport for NoTransport {
        async fn send(&self, _request: RequestAttempt) -> Result<HttpResponse, TransportError> {
            Err(TransportError::Connect("offline".into()))
        }
    }

    fn gateway(base_url: &str) -> RequestGateway {
        RequestGateway::builder(GatewayConfig {
            base_url: base_url.to_string(),
            ..GatewayConfig::default()
        })
        .transport(Arc::new(NoTransport))
        .build()
        .unwrap()
    }

    #[test]
    fn url_building() {
        let gw = gateway("http://localhost:8001/");
        assert_eq!(gw.base_url(), "http://localhost:8001");
        assert_eq!(gw.build_url("/api/platforms", None), "http://localhost:8001/api/platforms");
        assert_eq!(gw.build_url("api/platforms", None), "http://localhost:8001/api/platforms");
        assert_eq!(
            gw.build_url("https://cdn.example.com/x.json", None),
            "https://cdn.example.com/x.json"
        );
        assert_eq!(
            gw.build_url("http://localhost:8001/api/health", None),
            "http://localhost:8001/api/health"
        );
    }

    #[test]
    fn url_building_with_params() {
        let gw = gateway("http://localhost:8001");
        let params = QueryParams::new().with("a", 1).with("b", Option::<i64>::None).with("c", "");
        assert_eq!(gw.build_url("/x", Some(&params)), "http://localhost:8001/x?a=1");
        assert_eq!(
            gw.build_url("/x?skip=0", Some(&params)),
            "http://localhost:8001/x?skip=0&a=1"
        );
    }

    #[test]
    fn caller_authorization_wins() {
        let gw = gateway("http://localhost:8001");
        gw.set_token(Some("stored")).unwrap();

        let injected = gw.inner.prepare_headers(HeaderMap::new(), false).unwrap();
        assert_eq!(injected.get(AUTHORIZATION).unwrap(), "Bearer stored");

        let mut caller = HeaderMap::new();
        caller.insert(AUTHORIZATION, HeaderValue::from_static("Bearer mine"));
        let kept = gw.inner.prepare_headers(caller, false).unwrap();
        assert_eq!(kept.get(AUTHORIZATION).unwrap(), "Bearer mine");

        let exempt = gw.inner.prepare_headers(HeaderMap::new(), true).unwrap();
        assert!(exempt.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn invalid_config_is_rejected_at_build() {
        let err = RequestGateway::builder(GatewayConfig {
            retry_attempts: 0,
            ..GatewayConfig::default()
        })
        .transport(Arc::new(NoTransport))
        .build()
        .unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
    }

    #[test]
    fn payload_value_rejects_text() {
        assert_eq!(payload_value(Payload::Empty).unwrap(), Value::Null);
        assert!(payload_value(Payload::Text("x".into())).is_err());
    }
}
