//! Document text extraction: format dispatch, per-page PDF text,
//! table segmentation and canonical document assembly.

pub mod assemble;
pub mod docx;
pub mod error;
pub mod extractor;
pub mod format;
pub mod pdf;
pub mod pipeline;
pub mod tables;
pub mod types;

pub use assemble::{AssembledDocument, assemble};
pub use error::ExtractError;
pub use extractor::extract;
pub use format::DocumentFormat;
pub use pipeline::process_pdf;
pub use tables::{ExtractedTable, segment_tables};
pub use types::{ExtractedPage, PageEvent, ProgressTx};

/// Default maximum accepted file size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: usize = 50 * 1024 * 1024;
