//! Error taxonomy for the request gateway.
//!
//! `GatewayError` is `Clone`: a GET joined by several callers settles
//! once and every caller receives the same error value.

use crate::config::ConfigError;
use crate::storage::StorageError;
use crate::transport::TransportError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        body: Option<Value>,
    },

    /// The access token was rejected. `refreshed` is true when a new token
    /// was obtained and a manual retry will carry it.
    #[error("Unauthorized (refreshed: {refreshed}): {message}")]
    Unauthorized { refreshed: bool, message: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// Classification of an HTTP error status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorKind {
    Unauthorized,
    Forbidden,
    NotFound,
    ServerError,
    Unknown,
}

impl HttpErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => HttpErrorKind::Unauthorized,
            403 => HttpErrorKind::Forbidden,
            404 => HttpErrorKind::NotFound,
            500..=599 => HttpErrorKind::ServerError,
            _ => HttpErrorKind::Unknown,
        }
    }
}

impl GatewayError {
    /// Network failures and timeouts are retried; everything else is final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GatewayError::Network(_) | GatewayError::Timeout { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Http { status, .. } => Some(*status),
            GatewayError::Unauthorized { .. } => Some(401),
            _ => None,
        }
    }

    pub fn http_kind(&self) -> Option<HttpErrorKind> {
        self.status().map(HttpErrorKind::from_status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.http_kind() == Some(HttpErrorKind::Unauthorized)
    }

    pub fn is_not_found(&self) -> bool {
        self.http_kind() == Some(HttpErrorKind::NotFound)
    }

    /// JSON body of an HTTP error response, when the server sent one.
    pub fn body(&self) -> Option<&Value> {
        match self {
            GatewayError::Http { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}

impl From<TransportError> for GatewayError {
    fn from(err: TransportError) -> Self {
        GatewayError::Network(err.to_string())
    }
}

impl From<StorageError> for GatewayError {
    fn from(err: StorageError) -> Self {
        GatewayError::Storage(err.to_string())
    }
}

impl From<ConfigError> for GatewayError {
    fn from(err: ConfigError) -> Self {
        GatewayError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Decode(err.to_string())
    }
}

impl From<trustagency_core::EnvelopeError> for GatewayError {
    fn from(err: trustagency_core::EnvelopeError) -> Self {
        GatewayError::Decode(err.to_string())
    }
}

// ============================================================================
// USER-FACING MESSAGES
// ============================================================================

/// Language of user-facing error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "zh-CN")]
    ZhCn,
}

struct Messages {
    session_expired: &'static str,
    forbidden: &'static str,
    not_found: &'static str,
    server_error: &'static str,
    network: &'static str,
    timeout: &'static str,
    generic: &'static str,
}

const EN: Messages = Messages {
    session_expired: "Your session has expired, please log in again",
    forbidden: "You do not have permission to perform this action",
    not_found: "The requested resource does not exist",
    server_error: "Server error, please try again later",
    network: "Network error, please check your connection",
    timeout: "The request timed out, please try again",
    generic: "Request failed, please try again",
};

const ZH_CN: Messages = Messages {
    session_expired: "登录已过期，请重新登录",
    forbidden: "你没有权限执行此操作",
    not_found: "请求的资源不存在",
    server_error: "服务器错误，请稍后重试",
    network: "网络错误，请检查网络连接",
    timeout: "请求超时，请重试",
    generic: "请求失败，请重试",
};

impl Locale {
    fn messages(self) -> &'static Messages {
        match self {
            Locale::En => &EN,
            Locale::ZhCn => &ZH_CN,
        }
    }
}

/// Turn an error into a message suitable for showing to an end user.
///
/// A 422 surfaces the server's validation `detail`; other HTTP statuses
/// use a fixed message per class, falling back to the server message.
pub fn format_error_message(err: &GatewayError, locale: Locale) -> String {
    let messages = locale.messages();
    match err {
        GatewayError::Unauthorized { .. } => messages.session_expired.to_string(),
        GatewayError::Network(_) => messages.network.to_string(),
        GatewayError::Timeout { .. } => messages.timeout.to_string(),
        GatewayError::Http {
            status,
            message,
            body,
        } => match HttpErrorKind::from_status(*status) {
            HttpErrorKind::Unauthorized => messages.session_expired.to_string(),
            HttpErrorKind::Forbidden => messages.forbidden.to_string(),
            HttpErrorKind::NotFound => messages.not_found.to_string(),
            HttpErrorKind::ServerError => messages.server_error.to_string(),
            HttpErrorKind::Unknown => {
                if *status == 422 {
                    if let Some(detail) = body.as_ref().and_then(validation_detail) {
                        return detail;
                    }
                }
                if message.is_empty() {
                    messages.generic.to_string()
                } else {
                    message.clone()
                }
            }
        },
        GatewayError::Decode(_) | GatewayError::Storage(_) | GatewayError::Config(_) => {
            messages.generic.to_string()
        }
    }
}

/// `detail` is either a string or a list of `{loc, msg, type}` entries.
fn validation_detail(body: &Value) -> Option<String> {
    match body.get("detail")? {
        Value::String(detail) if !detail.is_empty() => Some(detail.clone()),
        Value::Array(entries) => {
            let parts: Vec<&str> = entries
                .iter()
                .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                .collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("; "))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn http(status: u16, body: Option<Value>) -> GatewayError {
        GatewayError::Http {
            status,
            message: "server said no".to_string(),
            body,
        }
    }

    #[test]
    fn retryable_classes() {
        assert!(GatewayError::Network("reset".into()).is_retryable());
        assert!(GatewayError::Timeout { timeout_ms: 10 }.is_retryable());
        assert!(!http(503, None).is_retryable());
        assert!(!GatewayError::Unauthorized {
            refreshed: false,
            message: String::new()
        }
        .is_retryable());
    }

    #[test]
    fn status_classification() {
        assert_eq!(http(404, None).http_kind(), Some(HttpErrorKind::NotFound));
        assert_eq!(http(502, None).http_kind(), Some(HttpErrorKind::ServerError));
        assert_eq!(http(409, None).http_kind(), Some(HttpErrorKind::Unknown));
        assert!(GatewayError::Unauthorized {
            refreshed: true,
            message: String::new()
        }
        .is_unauthorized());
        assert_eq!(GatewayError::Decode("x".into()).http_kind(), None);
    }

    #[test]
    fn localized_messages() {
        assert_eq!(
            format_error_message(&http(403, None), Locale::ZhCn),
            "你没有权限执行此操作"
        );
        assert_eq!(
            format_error_message(&GatewayError::Timeout { timeout_ms: 1 }, Locale::En),
            "The request timed out, please try again"
        );
        assert_eq!(
            format_error_message(&http(409, None), Locale::En),
            "server said no"
        );
    }

    #[test]
    fn validation_detail_is_surfaced() {
        let err = http(422, Some(json!({"detail": "slug already exists"})));
        assert_eq!(format_error_message(&err, Locale::En), "slug already exists");

        let err = http(
            422,
            Some(json!({"detail": [{"loc": ["body", "name"], "msg": "field required"}]})),
        );
        assert_eq!(format_error_message(&err, Locale::ZhCn), "field required");
    }
}
