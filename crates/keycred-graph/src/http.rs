//! Response and transport error handling shared by the Graph and discovery clients.

use keycred_core::{KeyCredError, Result, UploadError};
use reqwest::{Client as HttpClient, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Build the underlying HTTP client.
pub(crate) fn build_http(timeout: Duration, user_agent: &str) -> Result<HttpClient> {
    HttpClient::builder()
        .timeout(timeout)
        .user_agent(user_agent)
        .gzip(true)
        .build()
        .map_err(|e| UploadError::Connection(format!("failed to build HTTP client: {e}")).into())
}

/// Parse and validate a base URL.
pub(crate) fn parse_base_url(base: &str) -> Result<Url> {
    let url = Url::parse(base).map_err(|e| KeyCredError::InvalidUrl(format!("{base}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(KeyCredError::InvalidUrl(format!("{base}: not a base URL")));
    }
    Ok(url)
}

/// Append percent-encoded path segments to a base URL.
pub(crate) fn join_segments(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| KeyCredError::InvalidUrl(base.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Map a reqwest failure to the upload taxonomy.
pub(crate) fn transport_error(e: &reqwest::Error, timeout: Duration) -> KeyCredError {
    if e.is_timeout() {
        warn!(timeout_secs = timeout.as_secs(), "request timed out; outcome unknown");
        UploadError::Timeout(timeout.as_secs()).into()
    } else {
        UploadError::Connection(e.to_string()).into()
    }
}

/// Handle a response that returns JSON
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response, timeout: Duration) -> Result<T> {
    let status = response.status();

    if status.is_success() {
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(&e, timeout))?;
        serde_json::from_str(&body).map_err(KeyCredError::Json)
    } else {
        Err(error_from_response(status.as_u16(), response).await)
    }
}

/// Handle a response that returns no body (Graph answers 204)
pub(crate) async fn read_empty(response: Response) -> Result<()> {
    let status = response.status();

    if status.is_success() {
        Ok(())
    } else {
        Err(error_from_response(status.as_u16(), response).await)
    }
}

/// Convert an error response to an [`UploadError`], keeping the server message.
async fn error_from_response(status: u16, response: Response) -> KeyCredError {
    let body = response.text().await.unwrap_or_default();
    let (code, message) = parse_error_body(&body);
    warn!(status, code = code.as_deref().unwrap_or(""), %message, "request failed");
    UploadError::from_status(status, code, message).into()
}

/// Extract code and message from a Graph (`{"error":{"code","message"}}`) or
/// identity platform (`{"error","error_description"}`) error body.
///
/// Falls back to the raw body, or the literal `empty response body`.
pub(crate) fn parse_error_body(body: &str) -> (Option<String>, String) {
    let fallback = if body.trim().is_empty() {
        "empty response body".to_string()
    } else {
        body.to_string()
    };

    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return (None, fallback);
    };

    match value.get("error") {
        Some(serde_json::Value::Object(error)) => {
            let code = error.get("code").and_then(|c| c.as_str()).map(String::from);
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .map_or(fallback, String::from);
            (code, message)
        }
        Some(serde_json::Value::String(code)) => {
            let message = value
                .get("error_description")
                .and_then(|m| m.as_str())
                .map_or_else(|| code.clone(), String::from);
            (Some(code.clone()), message)
        }
        _ => (None, fallback),
    }
}
