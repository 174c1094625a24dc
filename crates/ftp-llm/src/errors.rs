//! Model adapter errors.

/// Result type alias for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors from a generative model round trip.
///
/// None of these are retried; the caller receives them as-is.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not the expected JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The endpoint answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error description.
        message: String,
        /// Provider-specific error code.
        code: Option<String>,
    },

    /// The endpoint answered but produced no text.
    #[error("model returned an empty response")]
    EmptyResponse,

    /// The adapter is misconfigured.
    #[error("model configuration error: {message}")]
    Config {
        /// Error description.
        message: String,
    },
}

impl ModelError {
    /// Whether a later identical request could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            Self::Json(_) | Self::EmptyResponse | Self::Config { .. } => false,
        }
    }

    /// Error category string for logs.
    pub fn category(&self) -> &str {
        match self {
            Self::Http(_) => "network",
            Self::Json(_) => "parse",
            Self::Api { .. } => "api",
            Self::EmptyResponse => "empty",
            Self::Config { .. } => "config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display() {
        let err = ModelError::Api {
            status: 503,
            message: "Overloaded".into(),
            code: None,
        };
        assert_eq!(err.to_string(), "API error (503): Overloaded");
        assert!(err.is_transient());
        assert_eq!(err.category(), "api");
    }

    #[test]
    fn client_errors_are_not_transient() {
        let err = ModelError::Api {
            status: 400,
            message: "bad request".into(),
            code: Some("invalid_request_error".into()),
        };
        assert!(!err.is_transient());
        assert!(!ModelError::EmptyResponse.is_transient());
    }

    #[test]
    fn json_error_converts() {
        let err: ModelError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.category(), "parse");
    }
}
