use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pravo_extract::ExtractError;
use pravo_gigachat::GigaChatError;
use pravo_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to bind {0}: {1}")]
    Bind(String, std::io::Error),
    #[error("server error: {0}")]
    Server(String),
}

/// Error surfaced to HTTP clients as `{"error": ..., "kind": ...}`.
///
/// The `kind` tag is a stable contract; clients dispatch on it, so new
/// failure modes get new tags rather than repurposing existing ones.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    pub(crate) fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "invalid_request",
            message: message.into(),
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            kind: "internal",
            message: message.into(),
        }
    }

    #[cfg(test)]
    pub(crate) fn kind(&self) -> &'static str {
        self.kind
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(kind = self.kind, "{}", self.message);
        } else {
            tracing::debug!(kind = self.kind, "{}", self.message);
        }
        let body = serde_json::json!({ "error": self.message, "kind": self.kind });
        (self.status, Json(body)).into_response()
    }
}

impl From<ExtractError> for ApiError {
    fn from(err: ExtractError) -> Self {
        let (status, kind) = match &err {
            ExtractError::UnsupportedFormat(_) => (StatusCode::BAD_REQUEST, "unsupported_format"),
            ExtractError::ExtractionFailed(_) => (StatusCode::BAD_REQUEST, "extraction_failed"),
            ExtractError::EmptyDocument => (StatusCode::BAD_REQUEST, "empty_document"),
            ExtractError::FileTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "file_too_large"),
        };
        Self {
            status,
            kind,
            message: err.to_string(),
        }
    }
}

impl From<GigaChatError> for ApiError {
    fn from(err: GigaChatError) -> Self {
        let (status, kind) = match &err {
            GigaChatError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            GigaChatError::UploadFailed(_) => (StatusCode::BAD_GATEWAY, "upload_failed"),
            GigaChatError::Http(_) | GigaChatError::Auth(_) | GigaChatError::Unavailable(_) => {
                (StatusCode::BAD_GATEWAY, "provider_unavailable")
            }
            GigaChatError::Api { .. } => (StatusCode::BAD_GATEWAY, "provider_error"),
            GigaChatError::Json(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        Self {
            status,
            kind,
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Provider(inner) => inner.into(),
            StoreError::NotFound(_) => Self {
                status: StatusCode::NOT_FOUND,
                kind: "not_found",
                message: err.to_string(),
            },
            StoreError::DanglingReference(_) => Self {
                status: StatusCode::NOT_FOUND,
                kind: "dangling_reference",
                message: err.to_string(),
            },
            StoreError::Sqlite(_)
            | StoreError::Migration(_)
            | StoreError::InvalidTimestamp(_)
            | StoreError::CompensationFailed { .. } => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                kind: "persistence_failed",
                message: err.to_string(),
            },
        }
    }
}
