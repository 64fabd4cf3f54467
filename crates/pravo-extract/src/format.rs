use crate::error::ExtractError;

/// Document formats accepted for ingestion.
///
/// Dispatch is by explicit tag; unknown extensions are rejected up front
/// rather than falling through to a default strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Doc,
    Txt,
}

impl DocumentFormat {
    /// Resolve a format from a file extension, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::UnsupportedFormat` for any extension outside
    /// the accepted set.
    pub fn from_extension(ext: &str) -> Result<Self, ExtractError> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "doc" => Ok(Self::Doc),
            "txt" => Ok(Self::Txt),
            other => Err(ExtractError::UnsupportedFormat(other.to_owned())),
        }
    }

    /// Resolve a format from a full filename.
    ///
    /// # Errors
    ///
    /// Returns `ExtractError::UnsupportedFormat` if the filename has no
    /// extension or an unknown one.
    pub fn from_filename(name: &str) -> Result<Self, ExtractError> {
        let ext = std::path::Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ExtractError::UnsupportedFormat(name.to_owned()))?;
        Self::from_extension(ext)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
            Self::Doc => "doc",
            Self::Txt => "txt",
        }
    }
}
