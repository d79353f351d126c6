//! Structure-aware chunking
//!
//! Splits text into paragraphs on blank-line boundaries and accumulates
//! them into chunks up to the target size. Oversized paragraphs are split
//! into sentences; an oversized single sentence falls back to the
//! fixed-window walk for that sentence alone.
//!
//! The strategy carries a cooperative wall-clock guard, checked once per
//! paragraph: segmentation is not interruptible, so the budget is a
//! check-and-bail at well-defined checkpoints. On timeout the remainder
//! of the text is finished by the fixed-window walk, resuming from the
//! first unprocessed paragraph rather than restarting.

use std::time::Instant;

use super::fixed;
use super::sentence::{segment_with_regex, SentenceSegmenter};

/// Safety cap on the paragraph count; pathological input past the cap
/// rides along in the final paragraph
const MAX_PARAGRAPHS: usize = 1_000;

/// Chunk text along paragraph/sentence boundaries.
///
/// Returned pieces are disjoint; overlap is injected by the caller as a
/// post-process.
pub fn chunk_structured(
    text: &str,
    target_size: usize,
    segmenter: Option<&dyn SentenceSegmenter>,
    deadline: Instant,
) -> Vec<String> {
    let paragraphs = split_paragraphs(text);

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for (index, (offset, paragraph)) in paragraphs.iter().enumerate() {
        if Instant::now() >= deadline {
            tracing::warn!(
                "Structure-aware chunking exceeded its time budget at paragraph {}/{}; \
                 finishing with fixed windows",
                index,
                paragraphs.len()
            );
            flush(&mut chunks, &mut current);
            chunks.extend(fixed::chunk_windows(&text[*offset..], target_size, 0));
            return chunks;
        }

        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }

        if paragraph.len() > target_size {
            flush(&mut chunks, &mut current);
            split_oversized_paragraph(paragraph, target_size, segmenter, &mut chunks);
        } else if fits(&current, paragraph, target_size) {
            if !current.is_empty() {
                current.push_str("\n\n");
            }
            current.push_str(paragraph);
        } else {
            flush(&mut chunks, &mut current);
            current.push_str(paragraph);
        }
    }

    flush(&mut chunks, &mut current);
    chunks
}

/// Split on blank-line boundaries, capped at `MAX_PARAGRAPHS`.
///
/// Each paragraph carries its byte offset into the original text so a
/// timeout fallback can resume exactly where accumulation stopped.
fn split_paragraphs(text: &str) -> Vec<(usize, &str)> {
    let mut paragraphs = Vec::new();
    let mut offset = 0;

    for piece in text.split("\n\n") {
        if paragraphs.len() + 1 >= MAX_PARAGRAPHS {
            // Cap reached: the rest of the text is one final paragraph
            paragraphs.push((offset, &text[offset..]));
            return paragraphs;
        }
        paragraphs.push((offset, piece));
        offset += piece.len() + 2;
    }

    paragraphs
}

fn fits(current: &str, paragraph: &str, target_size: usize) -> bool {
    let sep = if current.is_empty() { 0 } else { 2 };
    current.len() + sep + paragraph.len() <= target_size
}

fn flush(chunks: &mut Vec<String>, current: &mut String) {
    if !current.trim().is_empty() {
        chunks.push(std::mem::take(current));
    } else {
        current.clear();
    }
}

/// Split a paragraph larger than the target into sentence groups;
/// sentences that are themselves oversized go through the fixed-window
/// walk alone.
fn split_oversized_paragraph(
    paragraph: &str,
    target_size: usize,
    segmenter: Option<&dyn SentenceSegmenter>,
    chunks: &mut Vec<String>,
) {
    let sentences = match segmenter {
        Some(segmenter) => segmenter.segment(paragraph),
        None => segment_with_regex(paragraph),
    };

    let mut current = String::new();
    for sentence in &sentences {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }

        if sentence.len() > target_size {
            flush(chunks, &mut current);
            chunks.extend(fixed::chunk_windows(sentence, target_size, 0));
        } else if current.len() + usize::from(!current.is_empty()) + sentence.len() <= target_size
        {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(sentence);
        } else {
            flush(chunks, &mut current);
            current.push_str(sentence);
        }
    }
    flush(chunks, &mut current);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::sentence::UnicodeSegmenter;
    use std::time::Duration;

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    #[test]
    fn test_paragraph_accumulation() {
        let text = "Alpha one.\n\nBeta two.\n\nGamma three.";
        let chunks = chunk_structured(text, 25, Some(&UnicodeSegmenter), far_deadline());
        // 10 + 2 + 9 = 21 fits; adding the third (12 more) does not
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "Alpha one.\n\nBeta two.");
        assert_eq!(chunks[1], "Gamma three.");
    }

    #[test]
    fn test_oversized_paragraph_split_into_sentences() {
        let text = "Sentence one is here. Sentence two is here. Sentence three is here.";
        let chunks = chunk_structured(text, 50, Some(&UnicodeSegmenter), far_deadline());
        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.len() <= 50, "chunk too big: {:?}", chunk);
        }
    }

    #[test]
    fn test_oversized_sentence_uses_fixed_windows() {
        let long_sentence = format!("{} end.", "word ".repeat(60));
        let chunks = chunk_structured(&long_sentence, 50, Some(&UnicodeSegmenter), far_deadline());
        assert!(chunks.len() > 1);
        let recovered: usize = chunks.iter().map(String::len).sum();
        assert!(recovered >= long_sentence.trim().len() - chunks.len() * 2);
    }

    #[test]
    fn test_timeout_falls_back_and_still_covers_text() {
        let text = "First paragraph.\n\nSecond paragraph.\n\nThird paragraph.";
        // Deadline already passed: everything goes through the fallback
        let chunks = chunk_structured(text, 20, Some(&UnicodeSegmenter), Instant::now());
        assert!(!chunks.is_empty());
        let joined = chunks.concat();
        assert!(joined.contains("First paragraph."));
        assert!(joined.contains("Third paragraph."));
    }

    #[test]
    fn test_regex_fallback_when_no_segmenter() {
        let text = "One long sentence here. Another long sentence there. And a third one follows.";
        let chunks = chunk_structured(text, 55, None, far_deadline());
        assert!(chunks.len() >= 2);
    }

    #[test]
    fn test_paragraph_cap_keeps_remainder() {
        let text = vec!["p"; 3_000].join("\n\n");
        let chunks = chunk_structured(&text, 100, None, far_deadline());
        let total_ps: usize = chunks
            .iter()
            .map(|c| c.matches('p').count())
            .sum();
        assert_eq!(total_ps, 3_000);
    }

    #[test]
    fn test_blank_heavy_input_produces_no_empty_chunks() {
        let text = "\n\n\n\nreal content\n\n\n\n\n\nmore content\n\n";
        let chunks = chunk_structured(text, 10, None, far_deadline());
        for chunk in &chunks {
            assert!(!chunk.trim().is_empty());
        }
    }
}
