//! Page-by-page text extraction
//!
//! Opens a document, iterates pages in bounded batches, and accumulates a
//! single concatenated text buffer while recording each page's character
//! range within it. Low-yield pages are handed to the recognition engine
//! and the recovered text is spliced back into both buffers.

mod extractor;
mod types;

pub use extractor::{PageExtractor, LOW_YIELD_THRESHOLD};
pub use types::{ExtractionResult, PageRecord};
