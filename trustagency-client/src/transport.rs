//! HTTP transport seam.
//!
//! The gateway owns retry, timeout, caching and auth; a [`Transport`]
//! performs exactly one network attempt. [`ReqwestTransport`] is the
//! production implementation; tests script a mock behind the same trait.

use async_trait::async_trait;
use futures_util::stream;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Chunk size used when streaming an upload body with progress reporting.
const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Only POST, PUT and PATCH send a JSON payload.
    pub fn carries_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }

    fn to_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upload progress callback, called with a percentage in `0.0..=100.0`.
pub type ProgressFn = Arc<dyn Fn(f64) + Send + Sync>;

/// A file to upload as the `file` part of a multipart body.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Multipart body: the file plus extra text fields.
#[derive(Clone)]
pub struct UploadForm {
    pub file: UploadFile,
    pub fields: Vec<(String, String)>,
    pub progress: Option<ProgressFn>,
}

impl fmt::Debug for UploadForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadForm")
            .field("file_name", &self.file.file_name)
            .field("size", &self.file.bytes.len())
            .field("fields", &self.fields)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(UploadForm),
}

/// One network attempt.
#[derive(Debug, Clone)]
pub struct RequestAttempt {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: RequestBody,
    /// 1-based attempt number within the call.
    pub attempt: u32,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: RequestAttempt) -> Result<HttpResponse, TransportError>;
}

/// Transport over a shared `reqwest::Client`.
///
/// The client carries no timeout of its own; the gateway bounds each
/// attempt and drops the future when it elapses.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: RequestAttempt) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.to_reqwest(), &request.url)
            .headers(request.headers);

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(form) => builder.multipart(build_form(form)?),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn build_form(form: UploadForm) -> Result<Form, TransportError> {
    let UploadForm {
        file,
        fields,
        progress,
    } = form;

    let mut multipart = Form::new();
    for (name, value) in fields {
        multipart = multipart.text(name, value);
    }

    let mut part = match progress {
        Some(progress) => {
            let total = file.bytes.len() as u64;
            Part::stream_with_length(progress_body(file.bytes, progress), total)
        }
        None => Part::bytes(file.bytes),
    }
    .file_name(file.file_name);

    if let Some(content_type) = &file.content_type {
        part = part
            .mime_str(content_type)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
    }
    Ok(multipart.part("file", part))
}

/// Stream `bytes` in chunks, reporting the cumulative percentage sent.
fn progress_body(bytes: Vec<u8>, progress: ProgressFn) -> reqwest::Body {
    let total = bytes.len();
    if total == 0 {
        progress(100.0);
        return reqwest::Body::from(bytes);
    }
    let chunks: Vec<Vec<u8>> = bytes.chunks(UPLOAD_CHUNK_BYTES).map(<[u8]>::to_vec).collect();
    let mut sent = 0usize;
    let body = stream::iter(chunks.into_iter().map(move |chunk| {
        sent += chunk.len();
        progress(percent(sent, total));
        Ok::<_, std::io::Error>(chunk)
    }));
    reqwest::Body::wrap_stream(body)
}

fn percent(sent: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (sent as f64 / total as f64) * 100.0
}
