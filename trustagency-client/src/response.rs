//! Response body parsing.

use crate::error::{GatewayError, GatewayResult};
use crate::transport::HttpResponse;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

/// A parsed response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Json(Value),
    Text(String),
    /// 204, an empty body, or malformed JSON on a success response.
    Empty,
}

impl Payload {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_json(self) -> Option<Value> {
        match self {
            Payload::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }

    /// Map the body onto `T`. An empty body decodes as JSON `null`.
    pub fn decode<T: DeserializeOwned>(self) -> GatewayResult<T> {
        match self {
            Payload::Json(value) => Ok(serde_json::from_value(value)?),
            Payload::Empty => Ok(serde_json::from_value(Value::Null)?),
            Payload::Text(text) => Err(GatewayError::Decode(format!(
                "expected a JSON body, got text ({} bytes)",
                text.len()
            ))),
        }
    }
}

fn is_json(response: &HttpResponse) -> bool {
    response
        .content_type()
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false)
}

/// Parse a success response. Malformed JSON is logged and yields
/// [`Payload::Empty`] instead of failing the call.
pub fn parse_success(response: &HttpResponse) -> Payload {
    if response.status == 204 || response.body.is_empty() {
        return Payload::Empty;
    }
    if is_json(response) {
        return match serde_json::from_slice(&response.body) {
            Ok(value) => Payload::Json(value),
            Err(err) => {
                warn!(status = response.status, error = %err, "Malformed JSON in success response");
                Payload::Empty
            }
        };
    }
    Payload::Text(String::from_utf8_lossy(&response.body).into_owned())
}

/// Build the error for a non-2xx response. The message prefers the
/// server's `detail`, then `message`, then the raw text body.
pub fn http_error(response: &HttpResponse) -> GatewayError {
    let json_body = if is_json(response) {
        serde_json::from_slice::<Value>(&response.body).ok()
    } else {
        None
    };

    let message = json_body
        .as_ref()
        .and_then(server_message)
        .or_else(|| {
            let text = String::from_utf8_lossy(&response.body).trim().to_string();
            (json_body.is_none() && !text.is_empty()).then_some(text)
        })
        .unwrap_or_else(|| "Request failed".to_string());

    GatewayError::Http {
        status: response.status,
        message,
        body: json_body,
    }
}

fn server_message(body: &Value) -> Option<String> {
    for key in ["detail", "message"] {
        match body.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Array(entries)) => {
                let first = entries
                    .iter()
                    .find_map(|entry| entry.get("msg").and_then(Value::as_str));
                if let Some(msg) = first {
                    return Some(msg.to_string());
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, CONTENT_TYPE};
    use serde_json::json;

    fn response(status: u16, content_type: Option<&str>, body: &str) -> HttpResponse {
        let mut headers = HeaderMap::new();
        if let Some(ct) = content_type {
            headers.insert(CONTENT_TYPE, ct.parse().unwrap());
        }
        HttpResponse {
            status,
            headers,
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn json_text_and_empty() {
        assert_eq!(
            parse_success(&response(200, Some("application/json"), r#"{"ok":true}"#)),
            Payload::Json(json!({"ok": true}))
        );
        assert_eq!(
            parse_success(&response(200, Some("text/html"), "<p>hi</p>")),
            Payload::Text("<p>hi</p>".into())
        );
        assert_eq!(parse_success(&response(204, Some("application/json"), "")), Payload::Empty);
        assert_eq!(parse_success(&response(200, None, "")), Payload::Empty);
    }

    #[test]
    fn malformed_json_is_lenient() {
        let parsed = parse_success(&response(200, Some("application/json"), "{not json"));
        assert_eq!(parsed, Payload::Empty);
    }

    #[test]
    fn error_message_prefers_detail() {
        let err = http_error(&response(
            400,
            Some("application/json"),
            r#"{"detail":"Platform name taken","message":"bad"}"#,
        ));
        match err {
            GatewayError::Http { status, message, body } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Platform name taken");
                assert!(body.is_some());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn error_message_falls_back() {
        let err = http_error(&response(502, Some("text/plain"), "Bad Gateway"));
        assert!(matches!(err, GatewayError::Http { ref message, .. } if message == "Bad Gateway"));

        let err = http_error(&response(500, Some("application/json"), "{}"));
        assert!(matches!(err, GatewayError::Http { ref message, .. } if message == "Request failed"));
    }

    #[test]
    fn decode_payloads() {
        let n: Option<u32> = Payload::Empty.decode().unwrap();
        assert_eq!(n, None);
        let v: Vec<u32> = Payload::Json(json!([1, 2])).decode().unwrap();
        assert_eq!(v, vec![1, 2]);
        assert!(Payload::Text("x".into()).decode::<u32>().is_err());
    }
}
