//! Page extractor
//!
//! Extraction runs in fixed-size batches to bound peak memory; each batch
//! is one `spawn_blocking` call since MuPDF work is CPU-bound. Position
//! bookkeeping must be bit-exact: every downstream chunk-to-page
//! assignment depends on the recorded ranges.

use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::cache::{FifoCache, FileFingerprint};
use crate::error::{PipelineError, Result};
use crate::mupdf::{DocumentSource, SafeDocument};
use crate::ocr::RecognitionEngine;
use crate::pipeline::ProgressSink;
use crate::settings::ProcessingSettings;

use super::types::{ExtractionResult, PageRecord};

/// Pages extracted per blocking batch
const EXTRACT_BATCH_SIZE: usize = 10;
/// Trimmed text with fewer characters than this marks a page as a
/// recognition candidate
pub const LOW_YIELD_THRESHOLD: usize = 100;
/// Recognition candidates processed per sub-batch
const OCR_SUB_BATCH: usize = 5;
/// Concurrent recognition workers; OCR is CPU-heavy and outer callers run
/// their own document pool
const OCR_WORKERS: usize = 2;
/// Render scale for pages handed to OCR
const OCR_RENDER_SCALE: f32 = 2.0;
/// Bounded extraction result cache
const EXTRACTION_CACHE_CAPACITY: usize = 50;
/// Separator appended after every page's text
const PAGE_SEPARATOR: char = '\n';

/// Extracts per-page text with character-position bookkeeping
pub struct PageExtractor {
    cache: FifoCache<FileFingerprint, ExtractionResult>,
}

impl Default for PageExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PageExtractor {
    pub fn new() -> Self {
        Self {
            cache: FifoCache::new(EXTRACTION_CACHE_CAPACITY),
        }
    }

    /// Validate and open a source without extracting.
    ///
    /// Used by the orchestrator to fail fast before committing to a full
    /// extraction pass.
    pub async fn validate(&self, source: DocumentSource) -> Result<usize> {
        let doc = tokio::task::spawn_blocking(move || SafeDocument::open(source))
            .await
            .map_err(|e| PipelineError::Resource(format!("Task join error: {}", e)))??;
        Ok(doc.page_count())
    }

    /// Extract the document's pages.
    ///
    /// Fails with `Validation` when the source is not a well-formed
    /// document and `Resource` when MuPDF cannot open or read it; never
    /// returns a partial result.
    pub async fn extract(
        &self,
        source: DocumentSource,
        settings: &ProcessingSettings,
        engine: &RecognitionEngine,
        progress: &dyn ProgressSink,
    ) -> Result<ExtractionResult> {
        let fingerprint = match &source {
            DocumentSource::Path(path) => FileFingerprint::for_path(path),
            DocumentSource::Bytes(_) => None,
        };

        if let Some(fp) = &fingerprint {
            if let Some(cached) = self.cache.get(fp) {
                tracing::debug!("Extraction cache hit for {}", source.id());
                progress.report("Loaded from cache", 100);
                return Ok(cached);
            }
        }

        let source_id = source.id();
        let doc = tokio::task::spawn_blocking(move || SafeDocument::open(source))
            .await
            .map_err(|e| PipelineError::Resource(format!("Task join error: {}", e)))??;
        let doc = Arc::new(doc);

        let total_pages = doc.page_count();
        let limit = if settings.max_pages == 0 {
            total_pages
        } else {
            total_pages.min(settings.max_pages)
        };

        let mut text = String::new();
        let mut pages: Vec<PageRecord> = Vec::with_capacity(limit);

        let mut batch_start = 0;
        while batch_start < limit {
            let batch_end = (batch_start + EXTRACT_BATCH_SIZE).min(limit);
            let batch_doc = doc.clone();

            let extracted = tokio::task::spawn_blocking(move || {
                let mut out = Vec::with_capacity(batch_end - batch_start);
                for index in batch_start..batch_end {
                    out.push(batch_doc.page_text(index)?);
                }
                Ok::<_, PipelineError>(out)
            })
            .await
            .map_err(|e| PipelineError::Resource(format!("Task join error: {}", e)))??;

            for (offset, (width, height, page_text)) in extracted.into_iter().enumerate() {
                append_page(
                    &mut text,
                    &mut pages,
                    batch_start + offset + 1,
                    width,
                    height,
                    page_text,
                );
            }

            let percent = (pages.len() * 100 / limit.max(1)) as u8;
            progress.report("Extracting pages", percent);
            batch_start = batch_end;
        }

        if settings.enable_recognition && engine.can_recognize() {
            self.recover_low_yield_pages(&doc, &mut text, &mut pages, engine, progress)
                .await;
        }

        let result = ExtractionResult {
            text,
            processed_pages: pages.len(),
            pages,
            total_pages,
        };

        if let Some(fp) = fingerprint {
            self.cache.insert(fp, result.clone());
        }

        tracing::info!(
            "Extracted {}/{} pages from {} ({} chars)",
            result.processed_pages,
            result.total_pages,
            source_id,
            result.text.len()
        );
        Ok(result)
    }

    /// Run OCR over low-yield pages in bounded sub-batches.
    ///
    /// Per-page failures are logged and treated as "no recovery"; they
    /// never abort the batch or block sibling pages.
    async fn recover_low_yield_pages(
        &self,
        doc: &Arc<SafeDocument>,
        text: &mut String,
        pages: &mut [PageRecord],
        engine: &RecognitionEngine,
        progress: &dyn ProgressSink,
    ) {
        let candidates: Vec<usize> = pages
            .iter()
            .enumerate()
            .filter(|(_, page)| is_low_yield(&page.text))
            .map(|(index, _)| index)
            .collect();

        if candidates.is_empty() {
            return;
        }
        tracing::info!("{} low-yield pages queued for OCR recovery", candidates.len());

        let mut recovered_count = 0usize;
        for sub_batch in candidates.chunks(OCR_SUB_BATCH) {
            let mut recovered: Vec<(usize, String)> = stream::iter(sub_batch.iter().copied())
                .map(|index| {
                    let doc = doc.clone();
                    async move {
                        let png = tokio::task::spawn_blocking(move || {
                            doc.render_page_png(index, OCR_RENDER_SCALE)
                        })
                        .await
                        .map_err(|e| PipelineError::Resource(format!("Task join error: {}", e)))
                        .and_then(|r| r);

                        let png = match png {
                            Ok(png) => png,
                            Err(e) => {
                                tracing::warn!("Render for OCR failed on page {}: {}", index + 1, e);
                                return None;
                            }
                        };

                        match engine.recognize(&png).await {
                            Ok(text) if !text.trim().is_empty() => Some((index, text)),
                            Ok(_) => None,
                            Err(e) => {
                                tracing::warn!("OCR failed on page {}: {}", index + 1, e);
                                None
                            }
                        }
                    }
                })
                .buffer_unordered(OCR_WORKERS)
                .filter_map(|item| async { item })
                .collect()
                .await;

            // Apply in page order so range shifts stay deterministic
            recovered.sort_by_key(|(index, _)| *index);
            for (index, recovered_text) in recovered {
                apply_recovery(text, pages, index, &recovered_text);
                recovered_count += 1;
            }
            progress.report("Recovering scanned pages", 100);
        }

        if recovered_count > 0 {
            tracing::info!("OCR recovered text for {} pages", recovered_count);
        }
    }
}

/// Whether direct extraction yielded implausibly little text.
///
/// The threshold counts characters, not bytes, so non-ASCII scripts get
/// the same yield bar as Latin text.
fn is_low_yield(text: &str) -> bool {
    text.trim().chars().count() < LOW_YIELD_THRESHOLD
}

/// Append a page's text to the accumulated buffer, recording its range.
///
/// `start = len(acc)`; the text plus one separator is appended;
/// `end = len(acc) - 1`, so the inclusive end covers the separator and
/// `end = start + text.len()` holds exactly.
fn append_page(
    acc: &mut String,
    pages: &mut Vec<PageRecord>,
    number: usize,
    width: f32,
    height: f32,
    text: String,
) {
    let start = acc.len();
    acc.push_str(&text);
    acc.push(PAGE_SEPARATOR);
    let end = acc.len() - 1;
    debug_assert_eq!(end, start + text.len());
    pages.push(PageRecord {
        number,
        width,
        height,
        text,
        start,
        end,
    });
}

/// Splice recovered text into a page and the concatenated buffer.
///
/// An empty original is replaced outright; a non-empty original gets the
/// recovery appended. The page's exact recorded range is rewritten in the
/// concatenated buffer and all subsequent ranges shift by the length
/// delta, keeping `end = start + len(text)` true for every page.
fn apply_recovery(acc: &mut String, pages: &mut [PageRecord], index: usize, recovered: &str) {
    let recovered = recovered.trim();
    if recovered.is_empty() {
        return;
    }

    let page = &pages[index];
    let old_len = page.text.len();
    let new_text = if page.text.trim().is_empty() {
        recovered.to_string()
    } else {
        format!("{}\n{}", page.text, recovered)
    };

    let range = page.start..page.start + old_len;
    acc.replace_range(range, &new_text);

    let delta = new_text.len() as isize - old_len as isize;
    let page = &mut pages[index];
    page.text = new_text;
    page.end = (page.end as isize + delta) as usize;

    for later in pages[index + 1..].iter_mut() {
        later.start = (later.start as isize + delta) as usize;
        later.end = (later.end as isize + delta) as usize;
    }
}
