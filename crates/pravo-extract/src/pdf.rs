use crate::error::{ExtractError, Result};
use crate::types::ExtractedPage;

/// Extract per-page text from PDF bytes.
///
/// Pages that yield no text (scanned images, empty pages) are kept with an
/// empty string so page numbering stays aligned with the source document.
///
/// # Errors
///
/// Returns `ExtractError::ExtractionFailed` if the bytes are not a parseable
/// PDF document.
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<ExtractedPage>> {
    let doc = lopdf::Document::load_mem(bytes)
        .map_err(|e| ExtractError::ExtractionFailed(format!("failed to parse PDF: {e}")))?;

    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    let mut pages = Vec::with_capacity(page_numbers.len());

    for number in page_numbers {
        // A single malformed content stream should not sink the whole
        // document; the page is kept with empty text.
        let text = doc.extract_text(&[number]).unwrap_or_default();
        pages.push(ExtractedPage::new(number, text));
    }

    Ok(pages)
}

/// Concatenated plain text of an entire PDF, no page markers.
///
/// # Errors
///
/// Returns `ExtractError::ExtractionFailed` on unparseable input.
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let pages = extract_pages(bytes)?;
    let mut out = String::new();
    for page in pages {
        let trimmed = page.text.trim();
        if trimmed.is_empty() {
            continue;
        }
        out.push_str(trimmed);
        out.push('\n');
    }
    Ok(out)
}
