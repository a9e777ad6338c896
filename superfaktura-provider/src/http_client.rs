//! HTTP transport helpers
//!
//! Sending, logging and response classification live here so the client
//! only has to build requests. One request per call; nothing is retried.

use std::time::Duration;

use http::StatusCode;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::{Map, Value};

use crate::error::{ApiError, Result};
use crate::utils::log_sanitizer::truncate_for_log;

/// Connect timeout (seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Whole-request timeout (seconds).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Build the shared HTTP client with the default timeouts.
pub fn create_http_client() -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| ApiError::TransportError {
            detail: format!("Failed to create HTTP client: {e}"),
        })
}

/// Sends prepared requests and turns upstream responses into JSON or [`ApiError`].
pub struct HttpUtils;

impl HttpUtils {
    /// Send a prepared request and return `(status, body)`.
    ///
    /// Only transport-level failures are errors here; every HTTP status is
    /// returned to the caller for [`map_response`](Self::map_response).
    pub async fn execute_request(
        request_builder: RequestBuilder,
        method: &Method,
        path: &str,
    ) -> Result<(u16, String)> {
        log::debug!("[superfaktura] {method} {path}");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout {
                    detail: e.to_string(),
                }
            } else {
                ApiError::TransportError {
                    detail: e.to_string(),
                }
            }
        })?;

        let status = response.status().as_u16();
        log::debug!("[superfaktura] Response Status: {status}");

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout {
                    detail: e.to_string(),
                }
            } else {
                ApiError::TransportError {
                    detail: format!("Failed to read response body: {e}"),
                }
            }
        })?;

        log::debug!("[superfaktura] Response Body: {}", truncate_for_log(&body));

        Ok((status, body))
    }

    /// Classify an upstream response.
    ///
    /// - 2xx with JSON → the JSON value (`{}` for an empty body)
    /// - 2xx with a non-zero `error` field → [`ApiError::UpstreamError`]
    /// - 2xx with anything else → [`ApiError::ParseError`]
    /// - non-2xx → [`ApiError::UpstreamError`] with the parsed payload if any
    pub fn map_response(status: u16, body: &str) -> Result<Value> {
        if !(200..300).contains(&status) {
            let payload = serde_json::from_str::<Value>(body).ok();
            let message = payload
                .as_ref()
                .and_then(upstream_message)
                .unwrap_or_else(|| fallback_message(status, body));
            return Err(ApiError::UpstreamError {
                status,
                message,
                payload,
            });
        }

        if body.trim().is_empty() {
            return Ok(Value::Object(Map::new()));
        }

        let value: Value = serde_json::from_str(body).map_err(|e| {
            log::error!("[superfaktura] JSON parse failed: {e}");
            log::error!("[superfaktura] Raw response: {}", truncate_for_log(body));
            ApiError::ParseError {
                detail: e.to_string(),
            }
        })?;

        if let Some(code) = error_flag(&value) {
            let message =
                upstream_message(&value).unwrap_or_else(|| format!("upstream reported error {code}"));
            return Err(ApiError::UpstreamError {
                status,
                message,
                payload: Some(value),
            });
        }

        Ok(value)
    }
}

/// Non-zero numeric `error` field on a top-level object.
fn error_flag(value: &Value) -> Option<&Value> {
    let flag = value.get("error")?;
    flag.as_f64().is_some_and(|code| code != 0.0).then_some(flag)
}

/// Human-readable message from an upstream JSON payload.
fn upstream_message(value: &Value) -> Option<String> {
    ["message", "error_message"]
        .iter()
        .filter_map(|key| value.get(*key))
        .find_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Object(_) | Value::Array(_) => Some(v.to_string()),
            _ => None,
        })
}

fn fallback_message(status: u16, body: &str) -> String {
    if body.trim().is_empty() {
        StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown status")
            .to_string()
    } else {
        truncate_for_log(body).into_owned()
    }
}
