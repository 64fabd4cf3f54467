use crate::docx;
use crate::error::{ExtractError, Result};
use crate::format::DocumentFormat;
use crate::pdf;

/// Extract plain text from raw file bytes for the given format.
///
/// The result is stripped of leading and trailing whitespace.
///
/// # Errors
///
/// - `ExtractError::ExtractionFailed` on malformed input, for any format.
/// - `ExtractError::EmptyDocument` if extraction yields only whitespace.
pub fn extract(bytes: &[u8], format: DocumentFormat) -> Result<String> {
    let raw = match format {
        DocumentFormat::Pdf => pdf::extract_text(bytes)?,
        // Legacy .doc files are accepted through the same OOXML path;
        // genuinely old binary .doc payloads fail as malformed archives.
        DocumentFormat::Docx | DocumentFormat::Doc => docx::extract_text(bytes)?,
        DocumentFormat::Txt => String::from_utf8_lossy(bytes).into_owned(),
    };

    let text = raw.trim();
    if text.is_empty() {
        return Err(ExtractError::EmptyDocument);
    }
    Ok(text.to_owned())
}
