#[derive(Debug, thiserror::Error)]
pub enum GigaChatError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("file not found: {0}")]
    NotFound(String),

    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("GigaChat API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("upload failed: {0}")]
    UploadFailed(String),
}

pub type Result<T> = std::result::Result<T, GigaChatError>;
