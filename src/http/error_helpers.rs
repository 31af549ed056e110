//! Error handling utilities for HTTP responses and error context formatting.

use crate::errors::GenaiError;
use reqwest::Response;
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Maximum characters to include from error body in context messages
const ERROR_BODY_PREVIEW_LENGTH: usize = 200;

/// Google's request ID header name.
///
/// This is a standard Google Cloud API header that uniquely identifies each request.
/// The value can be used when contacting Google support or correlating with server logs.
/// See: <https://cloud.google.com/apis/docs/system-parameters>
const REQUEST_ID_HEADER: &str = "x-goog-request-id";

/// Google API error envelope: `{"error": {"code", "message", "status"}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Checks if an HTTP response is successful, returning it if so or an error otherwise.
///
/// # Errors
///
/// Returns [`GenaiError::Api`] with status code, message, and request ID on
/// non-success status.
pub async fn check_response(response: Response) -> Result<Response, GenaiError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(read_error_with_context(response).await)
    }
}

/// Reads an error response body and creates a detailed [`GenaiError::Api`].
///
/// Extracts:
/// - HTTP status code for programmatic error handling
/// - The server's `error.message` when the body is a Google error envelope,
///   otherwise a truncated body preview
/// - Request ID from `x-goog-request-id` header for debugging/support
pub async fn read_error_with_context(response: Response) -> GenaiError {
    let status_code = response.status().as_u16();

    // Extract request ID from response headers before consuming the body
    let request_id = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    let error_body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("Failed to read error body: {}", e));

    let message = error_message_from_body(&error_body);

    tracing::debug!(
        status_code,
        request_id = request_id.as_deref(),
        "API returned error: {}",
        message
    );

    GenaiError::Api {
        status_code,
        message,
        request_id,
    }
}

/// Pulls a human-readable message out of an error response body.
fn error_message_from_body(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => match envelope.error.status {
            Some(status) => format!("{} ({})", envelope.error.message, status),
            None => envelope.error.message,
        },
        _ => truncate_for_context(body, ERROR_BODY_PREVIEW_LENGTH),
    }
}

/// Deserializes a successful response body, reporting failures as
/// [`GenaiError::MalformedResponse`] with a body preview and the target type.
pub fn deserialize_with_context<T: DeserializeOwned>(
    json_str: &str,
    type_name: &str,
) -> Result<T, GenaiError> {
    serde_json::from_str(json_str).map_err(|e| {
        tracing::warn!("Failed to deserialize {}: {}", type_name, e);
        GenaiError::MalformedResponse(format!(
            "Failed to parse {}: {}",
            type_name,
            format_json_parse_error(json_str, e)
        ))
    })
}

/// Formats JSON parsing context by including a preview of the raw JSON.
pub fn format_json_parse_error(json_str: &str, error: serde_json::Error) -> String {
    let preview = truncate_for_context(json_str, ERROR_BODY_PREVIEW_LENGTH);
    format!("JSON parse error: {} | Context: {}", error, preview)
}

/// Truncates a string to specified length, adding "..." if truncated.
///
/// Uses character-boundary-aware slicing to prevent panics on multi-byte UTF-8 characters.
pub(crate) fn truncate_for_context(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        // Find a valid UTF-8 character boundary at or before max_len
        let truncate_at = s
            .char_indices()
            .take_while(|(i, c)| i + c.len_utf8() <= max_len)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &s[..truncate_at])
    }
}
