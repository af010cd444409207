//! HTTP utilities for GCP REST API calls

use crate::error::{BigqueryError, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|&i| body.is_char_boundary(i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Pull `error.message` out of a Google API error body, if there is one
fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")
        .and_then(|e| e.get("message"))
        .and_then(|m| m.as_str())
        .map(|m| m.to_string())
}

/// Classify a non-success HTTP status
pub fn error_for_status(status: StatusCode, body: &str) -> BigqueryError {
    let message = extract_error_message(body).unwrap_or_else(|| status.to_string());

    match status.as_u16() {
        400 => BigqueryError::invalid_argument(message),
        401 | 403 => BigqueryError::permission_denied(message),
        404 => BigqueryError::not_found(message),
        409 => BigqueryError::already_exists(message),
        408 | 429 | 500..=599 => BigqueryError::unavailable(message),
        _ => BigqueryError::internal(format!("unexpected status {}: {}", status, message)),
    }
}

/// HTTP client wrapper for GCP API calls
#[derive(Clone)]
pub struct GcpHttpClient {
    client: Client,
}

impl GcpHttpClient {
    /// Create a new HTTP client
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("bqctl/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| {
                BigqueryError::internal(format!("failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    /// Make a GET request to a GCP API
    pub async fn get(&self, url: &str, token: &str, query: &[(&str, String)]) -> Result<Value> {
        tracing::debug!("GET {}", url);
        let request = self.client.get(url).bearer_auth(token).query(query);
        self.send(request).await
    }

    /// Make a POST request to a GCP API
    pub async fn post(&self, url: &str, token: &str, body: Option<&Value>) -> Result<Value> {
        tracing::debug!("POST {}", url);

        let mut request = self.client.post(url).bearer_auth(token);

        if let Some(body) = body {
            request = request.json(body);
        }

        self.send(request).await
    }

    /// Make a DELETE request to a GCP API
    pub async fn delete(
        &self,
        url: &str,
        token: &str,
        query: &[(&str, String)],
    ) -> Result<Value> {
        tracing::debug!("DELETE {}", url);
        let request = self.client.delete(url).bearer_auth(token).query(query);
        self.send(request).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!("Request failed before a response: {}", e);
            BigqueryError::unavailable(format!("failed to send request: {}", e))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            BigqueryError::unavailable(format!("failed to read response body: {}", e))
        })?;

        if !status.is_success() {
            // Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(error_for_status(status, &body));
        }

        // Handle empty response (DELETE returns 204)
        if body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| {
            BigqueryError::internal(format!("failed to parse response JSON: {}", e))
        })
    }
}

/// Format an error for display on the terminal
pub fn format_gcp_error(error: &BigqueryError) -> String {
    match error {
        BigqueryError::PermissionDenied { message } => format!(
            "Permission denied: {}. Check your IAM permissions on the project.",
            message
        ),
        BigqueryError::Auth(_) => {
            "Authentication failed. Run 'gcloud auth application-default login'.".to_string()
        }
        BigqueryError::Unavailable { message } => format!(
            "BigQuery temporarily unavailable ({}). Please try again.",
            message
        ),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_error_for_status_mapping() {
        let cases = [
            (400, ErrorKind::InvalidArgument),
            (401, ErrorKind::PermissionDenied),
            (403, ErrorKind::PermissionDenied),
            (404, ErrorKind::NotFound),
            (409, ErrorKind::AlreadyExists),
            (429, ErrorKind::Unavailable),
            (500, ErrorKind::Unavailable),
            (503, ErrorKind::Unavailable),
            (418, ErrorKind::Internal),
        ];

        for (code, kind) in cases {
            let status = StatusCode::from_u16(code).unwrap();
            assert_eq!(error_for_status(status, "").kind(), kind, "status {code}");
        }
    }

    #[test]
    fn test_error_message_taken_from_body() {
        let body = r#"{"error": {"code": 404, "message": "Not found: Dataset proj-a:sales"}}"#;
        let err = error_for_status(StatusCode::NOT_FOUND, body);
        assert_eq!(err.to_string(), "not found: Not found: Dataset proj-a:sales");
    }

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(sanitized.contains("500 bytes total"));
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize_for_log("a\nb\tc"), "abc");
    }
}
