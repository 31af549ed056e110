use thiserror::Error;

/// Defines errors that can occur when talking to the Generative Language API,
/// over REST or over a Live session.
///
/// # Example: Handling API Errors
///
/// ```ignore
/// match client.generate_content(request).await {
///     Err(GenaiError::Api { status_code: 429, request_id, .. }) => {
///         tracing::warn!("Rate limited, request_id: {:?}", request_id);
///         // Retry with backoff
///     }
///     Err(GenaiError::Api { status_code, message, request_id }) => {
///         tracing::error!("API error {}: {} (request: {:?})", status_code, message, request_id);
///     }
///     // ...
/// }
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenaiError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("SSE parsing error: {0}")]
    Parse(String),
    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// API error with structured context for debugging and automated handling.
    ///
    /// Contains the HTTP status code (for retry logic), error message, and
    /// optional request ID (for correlation with Google API logs/support).
    #[error("API error (HTTP {status_code}): {message}")]
    Api {
        /// HTTP status code (e.g., 400, 429, 500)
        status_code: u16,
        /// Error message from the API response body
        message: String,
        /// Request ID from `x-goog-request-id` header, if available
        request_id: Option<String>,
    },
    #[error("Internal client error: {0}")]
    Internal(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// API returned a successful response but with unexpected or invalid content.
    ///
    /// Unlike `InvalidInput` (caller's fault), this represents an issue with
    /// the API response itself.
    #[error("Malformed API response: {0}")]
    MalformedResponse(String),
    /// Failed to build the HTTP client.
    ///
    /// This typically only occurs in exceptional circumstances such as
    /// TLS backend initialization failures.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
    /// The Live transport could not be opened, or a send/receive failed
    /// because the socket is closed or broken.
    ///
    /// Never retried internally. Open a new session to reconnect.
    #[error("Live connection error: {0}")]
    Connection(String),
    /// A well-formed call could not be carried out: the outbound message could
    /// not be serialized, or the session's usage contract was violated (for
    /// example two concurrent receive loops on one session).
    #[error("Live protocol error: {0}")]
    Protocol(String),
    /// A per-call cancellation token fired before the operation finished.
    #[error("Operation cancelled")]
    Cancelled,
}

impl GenaiError {
    /// Returns `true` if this error is likely transient and the request may succeed on retry.
    ///
    /// This helper identifies errors that are typically recoverable:
    /// - **HTTP errors**: Network issues, connection resets, TLS errors
    /// - **Live connection errors**: the socket dropped; a new session may succeed
    /// - **Rate limits (429)**: Temporary throttling, retry after backoff
    /// - **Server errors (5xx)**: Temporary server issues
    ///
    /// The library itself never retries; this is a hint for callers.
    ///
    /// # Example
    ///
    /// ```rust
    /// use genai_net::GenaiError;
    ///
    /// let rate_limited = GenaiError::Api {
    ///     status_code: 429,
    ///     message: "Resource exhausted".to_string(),
    ///     request_id: None,
    /// };
    /// assert!(rate_limited.is_retryable());
    ///
    /// let protocol = GenaiError::Protocol("receive already in progress".to_string());
    /// assert!(!protocol.is_retryable());
    /// ```
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            GenaiError::Http(_) | GenaiError::Connection(_) => true,

            GenaiError::Api { status_code, .. } => *status_code == 429 || *status_code >= 500,

            GenaiError::Parse(_)
            | GenaiError::Json(_)
            | GenaiError::Utf8(_)
            | GenaiError::Io(_)
            | GenaiError::Internal(_)
            | GenaiError::InvalidInput(_)
            | GenaiError::MalformedResponse(_)
            | GenaiError::ClientBuild(_)
            | GenaiError::Protocol(_)
            | GenaiError::Cancelled => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genai_error_api_display() {
        let error = GenaiError::Api {
            status_code: 429,
            message: "Rate limited".to_string(),
            request_id: Some("req-123".to_string()),
        };
        let display = format!("{}", error);
        assert!(display.contains("429"));
        assert!(display.contains("Rate limited"));
    }

    #[test]
    fn test_genai_error_api_with_empty_message() {
        let error = GenaiError::Api {
            status_code: 500,
            message: "".to_string(),
            request_id: None,
        };
        let display = format!("{}", error);
        assert!(display.contains("500"));
        assert!(display.contains("API error"));
    }

    #[test]
    fn test_genai_error_connection_display() {
        let error = GenaiError::Connection("connection reset by peer".to_string());
        let display = format!("{}", error);
        assert!(display.contains("Live connection error"));
        assert!(display.contains("connection reset by peer"));
    }

    #[test]
    fn test_genai_error_protocol_display() {
        let error = GenaiError::Protocol("receive already in progress".to_string());
        assert!(format!("{}", error).contains("Live protocol error"));
    }

    #[test]
    fn test_genai_error_cancelled_display() {
        assert_eq!(format!("{}", GenaiError::Cancelled), "Operation cancelled");
    }

    #[test]
    fn test_genai_error_json_from() {
        let json_err = serde_json::from_str::<serde_json::Value>("not valid json").unwrap_err();
        let genai_err: GenaiError = json_err.into();
        assert!(format!("{}", genai_err).contains("JSON deserialization error"));
    }

    #[test]
    fn test_genai_error_io_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.mp4");
        let genai_err: GenaiError = io_err.into();
        let display = format!("{}", genai_err);
        assert!(display.contains("I/O error"));
        assert!(display.contains("missing.mp4"));
    }

    #[test]
    fn test_genai_error_malformed_response_display() {
        let error = GenaiError::MalformedResponse("Missing upload URL".to_string());
        let display = format!("{}", error);
        assert!(display.contains("Malformed API response"));
        assert!(display.contains("upload URL"));
    }

    // =============================================================================
    // is_retryable() Tests
    // =============================================================================

    #[test]
    fn test_is_retryable_rate_limit_429() {
        let error = GenaiError::Api {
            status_code: 429,
            message: "Resource exhausted".to_string(),
            request_id: None,
        };
        assert!(error.is_retryable(), "429 errors should be retryable");
    }

    #[test]
    fn test_is_retryable_server_errors_5xx() {
        for status_code in [500, 502, 503, 504] {
            let error = GenaiError::Api {
                status_code,
                message: "Server error".to_string(),
                request_id: None,
            };
            assert!(
                error.is_retryable(),
                "{} errors should be retryable",
                status_code
            );
        }
    }

    #[test]
    fn test_is_retryable_client_errors_4xx_not_retryable() {
        for status_code in [400, 401, 403, 404, 422] {
            let error = GenaiError::Api {
                status_code,
                message: "Client error".to_string(),
                request_id: None,
            };
            assert!(
                !error.is_retryable(),
                "{} errors should NOT be retryable",
                status_code
            );
        }
    }

    #[test]
    fn test_is_retryable_connection_error() {
        let error = GenaiError::Connection("socket closed".to_string());
        assert!(error.is_retryable());
    }

    #[test]
    fn test_is_retryable_live_contract_errors_not_retryable() {
        assert!(!GenaiError::Protocol("bad".to_string()).is_retryable());
        assert!(!GenaiError::Cancelled.is_retryable());
    }

    #[test]
    fn test_is_retryable_invalid_input_not_retryable() {
        let error = GenaiError::InvalidInput("Missing model".to_string());
        assert!(!error.is_retryable());
    }
}
