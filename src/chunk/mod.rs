//! Retrieval chunking
//!
//! Consumes the concatenated document text plus the page-range table and
//! produces an ordered list of bounded-size chunks, each assigned to the
//! page holding the plurality of its character positions.
//!
//! Two strategies:
//! - fixed-window: raw character windows with natural-break snapping;
//!   always used for very large texts
//! - structure-aware: paragraph/sentence grouping with a cooperative
//!   wall-clock guard; falls back to fixed-window mid-stream on timeout
//!
//! Degenerate input never errors: empty text yields an empty list, short
//! text yields one chunk.

mod fixed;
mod pages;
mod sentence;
mod structure;

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::extract::PageRecord;

pub use pages::plurality_page;
pub use sentence::{RegexSegmenter, SentenceSegmenter, UnicodeSegmenter};

/// Texts above this size always use the fixed-window strategy
const LARGE_TEXT_THRESHOLD: usize = 100_000;
/// Wall-clock budget for the structure-aware strategy
const STRUCTURE_BUDGET: Duration = Duration::from_secs(20);

/// A bounded text unit for downstream indexing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk text, non-empty after trimming
    pub text: String,
    /// Page number (1-based) holding the plurality of this chunk's span
    pub page: usize,
}

/// Produces page-tagged chunks from extracted text
pub struct Chunker {
    /// Structure-aware sentence segmenter; `None` selects the
    /// punctuation-regex fallback
    segmenter: Option<Arc<dyn SentenceSegmenter>>,
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunker {
    /// Chunker with the UAX #29 sentence segmenter
    pub fn new() -> Self {
        Self {
            segmenter: Some(Arc::new(UnicodeSegmenter)),
        }
    }

    /// Chunker without a structure-aware segmenter; sentence splitting
    /// uses the punctuation-regex fallback
    pub fn without_segmenter() -> Self {
        Self { segmenter: None }
    }

    /// Chunk text into page-tagged pieces.
    ///
    /// Chunks hold roughly `target_size` characters (a window may run
    /// past the target to reach a nearby natural break); `overlap`
    /// characters of the previous chunk lead every chunk after the first.
    pub fn chunk_with_pages(
        &self,
        text: &str,
        pages: &[PageRecord],
        target_size: usize,
        overlap: usize,
    ) -> Vec<Chunk> {
        if text.trim().is_empty() || target_size == 0 {
            return Vec::new();
        }

        // Short input: exactly one chunk, assigned to the page holding
        // position 0
        if text.len() <= target_size {
            let page = pages.first().map(|p| p.number).unwrap_or(1);
            return vec![Chunk {
                text: text.trim().to_string(),
                page,
            }];
        }

        let (pieces, needs_injection) = if text.len() > LARGE_TEXT_THRESHOLD {
            (fixed::chunk_windows(text, target_size, overlap), false)
        } else {
            let deadline = Instant::now() + STRUCTURE_BUDGET;
            let pieces = structure::chunk_structured(
                text,
                target_size,
                self.segmenter.as_deref(),
                deadline,
            );
            if pieces.is_empty() {
                // Structure-aware produced nothing usable for non-empty
                // input; the window walk always can
                (fixed::chunk_windows(text, target_size, overlap), false)
            } else {
                (pieces, true)
            }
        };

        let mut chunks = pages::assign_pages(pieces, text, pages);

        if needs_injection && overlap > 0 && chunks.len() > 1 {
            inject_overlap(&mut chunks, overlap);
        }

        chunks
    }
}

/// Prepend to every chunk after the first the trailing `overlap`
/// characters of the previous chunk (or the whole previous chunk when
/// shorter). A post-process over already-assembled chunks.
fn inject_overlap(chunks: &mut [Chunk], overlap: usize) {
    for i in 1..chunks.len() {
        let prev = &chunks[i - 1].text;
        let mut tail_start = prev.len().saturating_sub(overlap);
        while !prev.is_char_boundary(tail_start) {
            tail_start += 1;
        }
        let prefix = prev[tail_start..].to_string();
        let current = std::mem::take(&mut chunks[i].text);
        chunks[i].text = format!("{}{}", prefix, current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_pages() -> Vec<PageRecord> {
        // Known ranges [0,99], [100,199], [200,299]
        (0..3)
            .map(|i| PageRecord {
                number: i + 1,
                width: 612.0,
                height: 792.0,
                text: "x".repeat(99),
                start: i * 100,
                end: i * 100 + 99,
            })
            .collect()
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        let chunker = Chunker::new();
        assert!(chunker.chunk_with_pages("", &[], 100, 10).is_empty());
        assert!(chunker.chunk_with_pages("   \n\t ", &[], 100, 10).is_empty());
    }

    #[test]
    fn test_short_text_yields_single_trimmed_chunk() {
        let chunker = Chunker::new();
        let pages = three_pages();
        let chunks = chunker.chunk_with_pages("  a short document  ", &pages, 100, 10);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "a short document");
        assert_eq!(chunks[0].page, 1);
    }

    #[test]
    fn test_no_chunk_is_whitespace_only() {
        let chunker = Chunker::new();
        let text = format!("{}\n\n\n\n{}", "alpha ".repeat(40), "beta ".repeat(40));
        let chunks = chunker.chunk_with_pages(&text, &[], 120, 20);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(!chunk.text.trim().is_empty());
        }
    }

    #[test]
    fn test_overlap_property_structure() {
        let chunker = Chunker::new();
        let paragraphs: Vec<String> = (0..12)
            .map(|i| format!("Paragraph number {} with some sentence content here.", i))
            .collect();
        let text = paragraphs.join("\n\n");
        let overlap = 20;
        let chunks = chunker.chunk_with_pages(&text, &[], 120, overlap);
        assert!(chunks.len() > 1);
        for i in 1..chunks.len() {
            let prev = &chunks[i - 1].text;
            let want = overlap.min(prev.len());
            assert!(
                chunks[i].text.starts_with(&prev[prev.len() - want..]),
                "chunk {} missing overlap prefix",
                i
            );
        }
    }

    #[test]
    fn test_overlap_property_fixed_large_text() {
        let chunker = Chunker::new();
        // Above the large-text threshold, forcing the fixed-window path
        let text = "lorem ipsum dolor sit amet consectetur. ".repeat(3000);
        let overlap = 50;
        let chunks = chunker.chunk_with_pages(&text, &[], 1000, overlap);
        assert!(chunks.len() > 1);
        for i in 1..chunks.len() {
            let prev = &chunks[i - 1].text;
            let want = overlap.min(prev.len());
            assert!(
                chunks[i].text.starts_with(&prev[prev.len() - want..]),
                "chunk {} missing overlap prefix",
                i
            );
        }
    }

    #[test]
    fn test_inject_overlap_uses_whole_short_previous_chunk() {
        let mut chunks = vec![
            Chunk {
                text: "tiny".into(),
                page: 1,
            },
            Chunk {
                text: "second chunk".into(),
                page: 1,
            },
        ];
        inject_overlap(&mut chunks, 100);
        assert_eq!(chunks[1].text, "tinysecond chunk");
    }

    #[test]
    fn test_zero_overlap_means_no_injection() {
        let chunker = Chunker::new();
        let text = "First paragraph here.\n\nSecond paragraph there.\n\nThird paragraph.";
        let chunks = chunker.chunk_with_pages(text, &[], 25, 0);
        assert!(chunks.len() > 1);
        // Chunks are disjoint paragraph groups
        assert!(chunks[1].text.starts_with("Second") || chunks[1].text.starts_with("Third"));
    }
}
