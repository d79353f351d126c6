//! Bibliographic identifier discovery
//!
//! Regex-driven DOI/ISBN discovery in extracted text. Stateless except
//! for a bounded FIFO result cache keyed by a caller-supplied key, since
//! callers reuse the same key across repeated lookups for one document.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::cache::FifoCache;
use crate::extract::ExtractionResult;

/// Pages scanned from the front of the document before the fallback pass
const PREFIX_PAGES: usize = 10;
/// Pages scanned from the back; many identifiers live in back matter
const SUFFIX_PAGES: usize = 3;
/// Bounded identifier result cache
const IDENTIFIER_CACHE_CAPACITY: usize = 50;

// DOI patterns, tried in order; the first match wins.
static DOI_BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b10\.\d{4,9}/[^\s<>\x22]+").unwrap());
static DOI_LABELED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bdoi\s*:?\s*(10\.\d{4,9}/[^\s<>\x22]+)").unwrap());
static DOI_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"doi\.org/(10\.\d{4,9}/[^\s<>\x22]+)").unwrap());

// ISBN patterns: labeled forms first, bare forms as a last resort.
static ISBN13_LABELED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bisbn(?:-?13)?\s*:?\s*(97[89](?:[- ]?\d){10})").unwrap());
static ISBN10_LABELED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bisbn(?:-?10)?\s*:?\s*((?:\d[- ]?){9}[\dXx])").unwrap()
});
static ISBN13_BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b97[89](?:[- ]?\d){10}\b").unwrap());
// Separators are mandatory here, unlike the 978/979-anchored bare
// ISBN-13: an unseparated 10-digit run is indistinguishable from phone
// numbers and order ids, so plain runs only count in labeled form.
static ISBN10_BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:\d[- ]){9}[\dXx]\b").unwrap());

/// Discovered bibliographic identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierResult {
    /// Digital Object Identifier, e.g. `10.1000/xyz123`
    pub doi: Option<String>,
    /// ISBN, normalized (no hyphens or spaces)
    pub isbn: Option<String>,
}

impl IdentifierResult {
    /// Whether neither identifier was found
    pub fn is_empty(&self) -> bool {
        self.doi.is_none() && self.isbn.is_none()
    }
}

/// Finds DOI/ISBN identifiers in text
pub struct IdentifierFinder {
    cache: FifoCache<String, IdentifierResult>,
}

impl Default for IdentifierFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentifierFinder {
    pub fn new() -> Self {
        Self {
            cache: FifoCache::new(IDENTIFIER_CACHE_CAPACITY),
        }
    }

    /// Find identifiers in a text blob. Pure function of the input.
    pub fn find(&self, text: &str) -> IdentifierResult {
        IdentifierResult {
            doi: find_doi(text),
            isbn: find_isbn(text),
        }
    }

    /// Find identifiers in an extracted document.
    ///
    /// Scans a bounded prefix of the document first; when that finds
    /// nothing, a bounded suffix is tried before reporting "not found".
    /// Results are memoized under the caller-supplied key.
    pub fn find_in_pages(
        &self,
        extraction: &ExtractionResult,
        cache_key: Option<&str>,
    ) -> IdentifierResult {
        if let Some(key) = cache_key {
            if let Some(cached) = self.cache.get(&key.to_string()) {
                return cached;
            }
        }

        let prefix = join_pages(extraction, 0, PREFIX_PAGES);
        let mut result = self.find(&prefix);

        if result.is_empty() && extraction.pages.len() > PREFIX_PAGES {
            let from = extraction.pages.len().saturating_sub(SUFFIX_PAGES);
            let suffix = join_pages(extraction, from, extraction.pages.len());
            result = self.find(&suffix);
        }

        if let Some(key) = cache_key {
            self.cache.insert(key.to_string(), result.clone());
        }
        result
    }
}

fn join_pages(extraction: &ExtractionResult, from: usize, to: usize) -> String {
    extraction
        .pages
        .iter()
        .skip(from)
        .take(to.saturating_sub(from))
        .map(|page| page.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

fn find_doi(text: &str) -> Option<String> {
    let raw = DOI_BARE
        .find(text)
        .map(|m| m.as_str().to_string())
        .or_else(|| {
            DOI_LABELED
                .captures(text)
                .map(|c| c[1].to_string())
        })
        .or_else(|| DOI_URL.captures(text).map(|c| c[1].to_string()))?;

    // Prose and citations often run punctuation into the suffix
    let trimmed = raw.trim_end_matches(['.', ',', ';', ')']);
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn find_isbn(text: &str) -> Option<String> {
    let raw = ISBN13_LABELED
        .captures(text)
        .map(|c| c[1].to_string())
        .or_else(|| ISBN10_LABELED.captures(text).map(|c| c[1].to_string()))
        .or_else(|| ISBN13_BARE.find(text).map(|m| m.as_str().to_string()))
        .or_else(|| ISBN10_BARE.find(text).map(|m| m.as_str().to_string()))?;

    Some(normalize_isbn(&raw))
}

/// Strip hyphens and spaces; uppercase a trailing X check digit
fn normalize_isbn(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '-' | ' '))
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::PageRecord;

    fn extraction_from(texts: &[&str]) -> ExtractionResult {
        let mut acc = String::new();
        let mut pages = Vec::new();
        for (i, text) in texts.iter().enumerate() {
            let start = acc.len();
            acc.push_str(text);
            acc.push('\n');
            pages.push(PageRecord {
                number: i + 1,
                width: 612.0,
                height: 792.0,
                text: text.to_string(),
                start,
                end: acc.len() - 1,
            });
        }
        ExtractionResult {
            text: acc,
            total_pages: texts.len(),
            processed_pages: texts.len(),
            pages,
        }
    }

    #[test]
    fn test_labeled_doi() {
        let finder = IdentifierFinder::new();
        let result = finder.find("... see DOI:10.1000/xyz123 for details");
        assert_eq!(result.doi.as_deref(), Some("10.1000/xyz123"));
    }

    #[test]
    fn test_bare_doi_wins_over_later_forms() {
        let finder = IdentifierFinder::new();
        let result = finder.find("cite 10.1234/abc.def99 or https://doi.org/10.9999/zzz");
        assert_eq!(result.doi.as_deref(), Some("10.1234/abc.def99"));
    }

    #[test]
    fn test_url_doi() {
        let finder = IdentifierFinder::new();
        let result = finder.find("available at https://doi.org/10.5555/12345678.");
        assert_eq!(result.doi.as_deref(), Some("10.5555/12345678"));
    }

    #[test]
    fn test_doi_trailing_punctuation_stripped() {
        let finder = IdentifierFinder::new();
        let result = finder.find("(see 10.1000/182).");
        assert_eq!(result.doi.as_deref(), Some("10.1000/182"));
    }

    #[test]
    fn test_labeled_isbn13_normalized() {
        let finder = IdentifierFinder::new();
        let result = finder.find("ISBN-13: 978-3-16-148410-0");
        assert_eq!(result.isbn.as_deref(), Some("9783161484100"));
    }

    #[test]
    fn test_labeled_isbn10() {
        let finder = IdentifierFinder::new();
        let result = finder.find("ISBN 0-306-40615-2");
        assert_eq!(result.isbn.as_deref(), Some("0306406152"));
    }

    #[test]
    fn test_isbn10_x_check_digit() {
        let finder = IdentifierFinder::new();
        let result = finder.find("ISBN: 0-8044-2957-x");
        assert_eq!(result.isbn.as_deref(), Some("080442957X"));
    }

    #[test]
    fn test_bare_isbn13() {
        let finder = IdentifierFinder::new();
        let result = finder.find("catalog entry 978-0-596-52068-7 (paperback)");
        assert_eq!(result.isbn.as_deref(), Some("9780596520687"));
    }

    #[test]
    fn test_unseparated_bare_isbn10_needs_a_label() {
        let finder = IdentifierFinder::new();
        // A plain 10-digit run could be anything; without a label it
        // must not be read as an ISBN
        assert!(finder.find("order ref 0306406152 shipped").isbn.is_none());
        // The same digits with a label are accepted
        let labeled = finder.find("ISBN 0306406152");
        assert_eq!(labeled.isbn.as_deref(), Some("0306406152"));
    }

    #[test]
    fn test_nothing_found() {
        let finder = IdentifierFinder::new();
        let result = finder.find("no identifiers in this prose at all");
        assert!(result.is_empty());
    }

    #[test]
    fn test_suffix_fallback_finds_back_matter_isbn() {
        // Identifier only in back matter, past the scanned prefix
        let mut texts: Vec<String> = (0..12).map(|i| format!("page {} filler text", i)).collect();
        texts.push("Colophon. ISBN-13: 978-3-16-148410-0".to_string());
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let extraction = extraction_from(&refs);

        let finder = IdentifierFinder::new();
        let result = finder.find_in_pages(&extraction, None);
        assert_eq!(result.isbn.as_deref(), Some("9783161484100"));
    }

    #[test]
    fn test_prefix_hit_skips_suffix_pass() {
        let extraction = extraction_from(&["DOI:10.1000/front", "middle", "DOI:10.1000/back"]);
        let finder = IdentifierFinder::new();
        let result = finder.find_in_pages(&extraction, None);
        assert_eq!(result.doi.as_deref(), Some("10.1000/front"));
    }

    #[test]
    fn test_cache_key_reuse() {
        let extraction = extraction_from(&["DOI:10.1000/cached"]);
        let finder = IdentifierFinder::new();
        let first = finder.find_in_pages(&extraction, Some("doc-1"));

        // Same key returns the memoized value even for different content
        let other = extraction_from(&["nothing here"]);
        let second = finder.find_in_pages(&other, Some("doc-1"));
        assert_eq!(first, second);
    }
}
