//! Extraction result types

use serde::{Deserialize, Serialize};

/// One page's extracted content and its place in the concatenated text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    /// Page number, 1-based
    pub number: usize,
    /// Page width in PDF points
    pub width: f32,
    /// Page height in PDF points
    pub height: f32,
    /// Extracted plain text
    pub text: String,
    /// Start of this page's text in the concatenated buffer
    pub start: usize,
    /// Inclusive end position in the concatenated buffer.
    ///
    /// Always `start + text.len()`: the page separator appended after the
    /// text is counted as part of the page's span.
    pub end: usize,
}

impl PageRecord {
    /// Whether a character position in the concatenated buffer falls on
    /// this page
    pub fn contains(&self, position: usize) -> bool {
        position >= self.start && position <= self.end
    }

    /// Number of positions of `[start, end]` (inclusive) that fall on
    /// this page
    pub fn span_overlap(&self, start: usize, end: usize) -> usize {
        let lo = start.max(self.start);
        let hi = end.min(self.end);
        if lo > hi {
            0
        } else {
            hi - lo + 1
        }
    }
}

/// Whole-document extraction output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Concatenated text of all processed pages, separator-joined
    pub text: String,
    /// Ordered page records with contiguous, non-overlapping ranges
    pub pages: Vec<PageRecord>,
    /// Pages in the source document
    pub total_pages: usize,
    /// Pages actually extracted (bounded by the max-pages setting)
    pub processed_pages: usize,
}
