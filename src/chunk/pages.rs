//! Chunk-to-page assignment
//!
//! Locates each assembled chunk in the original text and assigns the
//! page whose character range holds the plurality of the chunk's span.
//! The locate cursor only moves forward: ordering is preserved and a
//! snippet that recurs verbatim elsewhere resolves to its in-order
//! occurrence, without quadratic rescans.

use crate::extract::PageRecord;

use super::Chunk;

/// Longest verbatim probe used to locate a chunk.
///
/// Structure-aware chunks re-join paragraphs, so the full chunk string
/// may not occur verbatim; its leading paragraph always does.
const LOCATE_PROBE_LEN: usize = 64;

/// Turn assembled pieces into page-tagged chunks.
///
/// Whitespace-only pieces are dropped. A piece that cannot be located
/// (fully re-joined text) is attributed from the current cursor
/// position, which in practice is the start of its leading paragraph.
pub fn assign_pages(pieces: Vec<String>, text: &str, pages: &[PageRecord]) -> Vec<Chunk> {
    let mut chunks = Vec::with_capacity(pieces.len());
    let mut cursor = 0usize;

    for piece in pieces {
        if piece.trim().is_empty() {
            continue;
        }

        let probe = locate_probe(&piece);
        let start = match text
            .get(cursor..)
            .and_then(|rest| rest.find(probe))
        {
            Some(found) => {
                let absolute = cursor + found;
                // Advance past the found start only; overlapping windows
                // still locate correctly, and the cursor stays monotonic
                cursor = absolute + 1;
                absolute
            }
            None => cursor,
        };
        let end = (start + piece.len()).min(text.len()).saturating_sub(1).max(start);

        let page = plurality_page(pages, start, end);
        chunks.push(Chunk { text: piece, page });
    }

    chunks
}

/// Verbatim leading slice of a piece, bounded and boundary-clamped
fn locate_probe(piece: &str) -> &str {
    let trimmed = piece.trim_start();
    let mut len = LOCATE_PROBE_LEN.min(trimmed.len());
    while !trimmed.is_char_boundary(len) {
        len -= 1;
    }
    &trimmed[..len]
}

/// Page holding the plurality of the inclusive span `[start, end]`.
///
/// Ties go to the lowest page number. Positions outside every page (or
/// an empty page table) fall back to page 1.
pub fn plurality_page(pages: &[PageRecord], start: usize, end: usize) -> usize {
    let mut best_page = 0usize;
    let mut best_count = 0usize;

    for page in pages {
        let count = page.span_overlap(start, end);
        // Strict comparison: the first (lowest-numbered) page wins ties
        if count > best_count {
            best_count = count;
            best_page = page.number;
        }
    }

    if best_page == 0 {
        1
    } else {
        best_page
    }
}
