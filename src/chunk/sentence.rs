//! Sentence segmentation seam
//!
//! The structure-aware strategy splits oversized paragraphs on sentence
//! boundaries. Segmentation is a pluggable collaborator: UAX #29 by
//! default, with a punctuation-regex fallback when no segmenter is
//! configured.

use std::sync::LazyLock;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

/// Sentence segmentation contract: text in, sentence list out
pub trait SentenceSegmenter: Send + Sync {
    fn segment(&self, paragraph: &str) -> Vec<String>;
}

/// UAX #29 sentence segmentation.
///
/// Handles abbreviations, decimal numbers, and ellipses far better than
/// naive punctuation splitting.
pub struct UnicodeSegmenter;

impl SentenceSegmenter for UnicodeSegmenter {
    fn segment(&self, paragraph: &str) -> Vec<String> {
        paragraph
            .split_sentence_bounds()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.to_string())
            .collect()
    }
}

static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^.!?]*[.!?]+(?:\s+|$)").unwrap());

/// Punctuation-regex segmentation, used when no structure-aware
/// segmenter is available
pub struct RegexSegmenter;

impl SentenceSegmenter for RegexSegmenter {
    fn segment(&self, paragraph: &str) -> Vec<String> {
        segment_with_regex(paragraph)
    }
}

/// Split on terminal punctuation followed by whitespace; a trailing
/// fragment without a terminator becomes the final sentence
pub fn segment_with_regex(paragraph: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut last_end = 0;

    for m in SENTENCE_BREAK.find_iter(paragraph) {
        if !m.as_str().trim().is_empty() {
            sentences.push(m.as_str().to_string());
        }
        last_end = m.end();
    }

    if last_end < paragraph.len() {
        let tail = &paragraph[last_end..];
        if !tail.trim().is_empty() {
            sentences.push(tail.to_string());
        }
    }

    sentences
}
