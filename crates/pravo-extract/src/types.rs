/// Text of a single PDF page, 1-based numbering.
///
/// Ephemeral: produced and consumed within one extraction pass.
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    pub page_number: u32,
    pub text: String,
}

impl ExtractedPage {
    #[must_use]
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }
}

/// Per-page completion event emitted during table segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageEvent {
    pub page_number: u32,
    pub total_pages: usize,
    pub tables_found: usize,
}

/// Channel for incremental progress reporting over long documents.
pub type ProgressTx = tokio::sync::mpsc::UnboundedSender<PageEvent>;
