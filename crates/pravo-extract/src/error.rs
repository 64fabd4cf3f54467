#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("document contains no extractable text")]
    EmptyDocument,

    #[error("file too large: {0} bytes")]
    FileTooLarge(usize),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
