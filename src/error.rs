// src/error.rs
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::ALLOW},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced to the HTTP caller.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Content-Type must be application/json")]
    UnsupportedMediaType,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Internal(detail) => {
                tracing::error!(%detail, "unhandled error in request handler");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        // Display for Internal is the fixed message, details stay in the log.
        let mut response = (status, Json(json!({ "error": self.to_string() }))).into_response();
        if matches!(self, AppError::MethodNotAllowed) {
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("GET, POST"));
        }
        response
    }
}

/// Failure of an outbound provider call. Never reaches the caller as a status code.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} credential is not configured")]
    MissingCredential(&'static str),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected provider response: {0}")]
    InvalidResponse(String),

    #[error("could not store artifact: {0}")]
    Storage(#[from] std::io::Error),
}

impl ProviderError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Transport(_) => true,
            ProviderError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Short description safe to show end users. Provider bodies are left out.
    pub fn summary(&self) -> String {
        match self {
            ProviderError::MissingCredential(_) => self.to_string(),
            ProviderError::Transport(e) if e.is_timeout() => "request timed out".to_string(),
            ProviderError::Transport(_) => "request failed".to_string(),
            ProviderError::Status { status, .. } => format!("provider returned {status}"),
            ProviderError::InvalidResponse(_) => "unexpected provider response".to_string(),
            ProviderError::Storage(_) => "could not store artifact".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_error_hides_details() {
        let err = AppError::Internal("db exploded at /secret/path".into());
        assert_eq!(err.to_string(), "Internal server error");
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            AppError::UnsupportedMediaType.into_response().status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        let response = AppError::MethodNotAllowed.into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], "GET, POST");
        assert_eq!(
            AppError::BadRequest("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn retryable_statuses() {
        let status = |s| ProviderError::Status { status: s, body: String::new() };
        assert!(status(503).is_retryable());
        assert!(status(429).is_retryable());
        assert!(!status(401).is_retryable());
        assert!(!ProviderError::MissingCredential("OpenAI").is_retryable());
    }

    #[test]
    fn summary_leaves_out_provider_body() {
        let err = ProviderError::Status {
            status: 502,
            body: "<html>upstream key sk-abc rejected</html>".into(),
        };
        assert_eq!(err.summary(), "provider returned 502");
        assert!(err.to_string().contains("sk-abc"));
    }
}
