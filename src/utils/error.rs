use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FakeupError {
    #[error("Upstream request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Metrics error: {0}")]
    MetricsError(#[from] prometheus::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("missing query parameter: {name}")]
    MissingParameter { name: String },

    #[error("malformed query string: {reason}")]
    InvalidQuery { reason: String },

    #[error("stream unavailable")]
    StreamUnavailable { stream: String },

    #[error("basearch unavailable")]
    BasearchUnavailable { basearch: String },
}

impl FakeupError {
    /// HTTP status used when this error reaches a graph client.
    pub fn status_code(&self) -> StatusCode {
        match self {
            FakeupError::MissingParameter { .. } | FakeupError::InvalidQuery { .. } => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FakeupError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            // Bad requests carry no body.
            FakeupError::MissingParameter { name } => {
                tracing::debug!("rejecting graph request, missing '{}'", name);
                status.into_response()
            }
            FakeupError::InvalidQuery { reason } => {
                tracing::debug!("rejecting graph request: {}", reason);
                status.into_response()
            }
            // Unknown stream or basearch is a client miss, not a server fault.
            other @ (FakeupError::StreamUnavailable { .. }
            | FakeupError::BasearchUnavailable { .. }) => {
                tracing::warn!("graph lookup failed: {}", other);
                (status, other.to_string()).into_response()
            }
            other => {
                tracing::error!("graph request failed: {}", other);
                (status, other.to_string()).into_response()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, FakeupError>;
