//! PDF-to-document pipeline: page split, table segmentation, assembly.

use crate::assemble::{AssembledDocument, assemble};
use crate::error::Result;
use crate::pdf;
use crate::tables::segment_tables;
use crate::types::{ExtractedPage, ProgressTx};

/// Process PDF bytes into an assembled document.
///
/// CPU-bound over potentially hundreds of pages; callers run this under
/// `tokio::task::spawn_blocking`. Progress is reported per page through
/// `progress` as segmentation advances.
///
/// # Errors
///
/// Returns `ExtractError::ExtractionFailed` on unparseable PDF bytes.
pub fn process_pdf(bytes: &[u8], progress: Option<&ProgressTx>) -> Result<AssembledDocument> {
    let pages = pdf::extract_pages(bytes)?;
    Ok(process_pages(&pages, progress))
}

/// Segment and assemble already-extracted pages.
#[must_use]
pub fn process_pages(pages: &[ExtractedPage], progress: Option<&ProgressTx>) -> AssembledDocument {
    let mut text = String::new();
    for page in pages {
        let trimmed = page.text.trim();
        if trimmed.is_empty() {
            continue;
        }
        text.push_str(trimmed);
        text.push('\n');
    }

    let tables = segment_tables(pages, progress);
    tracing::info!(
        pages = pages.len(),
        tables = tables.len(),
        "document processed"
    );

    assemble(text.trim_end(), &tables)
}
