//! Pipeline orchestration
//!
//! Validates input, applies the file-size policy, and drives
//! extraction → identifier discovery → chunking in sequence, reporting a
//! weighted composite progress signal. Data flow is one-directional
//! (file → text → chunks); on any stage failure the original error is
//! wrapped with stage context and propagated, never a partial result.

mod progress;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chunk::{Chunk, Chunker};
use crate::error::{PipelineError, Result};
use crate::extract::{ExtractionResult, PageExtractor, PageRecord};
use crate::identify::{IdentifierFinder, IdentifierResult};
use crate::mupdf::DocumentSource;
use crate::ocr::{RecognitionConfig, RecognitionEngine};
use crate::settings::ProcessingSettings;

pub use progress::{NullProgress, ProgressSink, StageProgress};

// Weighted progress bands per stage
const EXTRACT_BAND: (u8, u8) = (0, 60);
const IDENTIFY_BAND: (u8, u8) = (60, 65);
const CHUNK_BAND: (u8, u8) = (65, 100);

/// Everything a downstream consumer needs from one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Page-addressable full text
    pub text: String,
    /// Ordered, page-tagged chunks
    pub chunks: Vec<Chunk>,
    /// Discovered bibliographic identifiers
    pub identifiers: IdentifierResult,
    /// Ordered page records
    pub pages: Vec<PageRecord>,
    /// Pages in the source document
    pub total_pages: usize,
    /// Pages actually extracted
    pub processed_pages: usize,
}

/// Drives the extraction-and-chunking pipeline for one document at a time
pub struct Pipeline {
    extractor: PageExtractor,
    finder: IdentifierFinder,
    chunker: Chunker,
    engine: RecognitionEngine,
}

impl Pipeline {
    /// Build a pipeline with the given recognition engine
    pub fn new(engine: RecognitionEngine) -> Self {
        Self {
            extractor: PageExtractor::new(),
            finder: IdentifierFinder::new(),
            chunker: Chunker::new(),
            engine,
        }
    }

    /// Build a pipeline, probing OCR backends once at startup
    pub async fn with_recognition(config: RecognitionConfig) -> Self {
        Self::new(RecognitionEngine::detect(config).await)
    }

    /// Process a file-backed document
    pub async fn process(
        &self,
        path: &Path,
        settings: &ProcessingSettings,
        progress: &dyn ProgressSink,
    ) -> Result<PipelineResult> {
        let source_id = path.display().to_string();
        settings.validate()?;
        self.enforce_size_policy(path, settings, progress)
            .map_err(|e| e.with_stage("validation", &source_id))?;

        self.run(DocumentSource::from_path(path), source_id, settings, progress)
            .await
    }

    /// Process an in-memory document.
    ///
    /// The hard size limit applies to the buffer; the extraction cache is
    /// bypassed because there is no file fingerprint.
    pub async fn process_bytes(
        &self,
        data: Vec<u8>,
        settings: &ProcessingSettings,
        progress: &dyn ProgressSink,
    ) -> Result<PipelineResult> {
        settings.validate()?;
        let source_id = format!("<{} bytes>", data.len());
        if data.len() as u64 > settings.max_file_size {
            return Err(PipelineError::Validation(format!(
                "Input of {} bytes exceeds the {} byte limit",
                data.len(),
                settings.max_file_size
            ))
            .with_stage("validation", &source_id));
        }

        self.run(DocumentSource::from_bytes(data), source_id, settings, progress)
            .await
    }

    async fn run(
        &self,
        source: DocumentSource,
        source_id: String,
        settings: &ProcessingSettings,
        progress: &dyn ProgressSink,
    ) -> Result<PipelineResult> {
        // Fail fast on malformed documents before committing to a full
        // extraction pass
        self.extractor
            .validate(source.clone())
            .await
            .map_err(|e| e.with_stage("validation", &source_id))?;

        let stage = StageProgress::new(progress, EXTRACT_BAND.0, EXTRACT_BAND.1);
        let extraction = self
            .extractor
            .extract(source, settings, &self.engine, &stage)
            .await
            .map_err(|e| e.with_stage("extraction", &source_id))?;

        let identifiers = self.discover_identifiers(&extraction, &source_id, settings, progress);

        let stage = StageProgress::new(progress, CHUNK_BAND.0, CHUNK_BAND.1);
        stage.report("Chunking text", 0);
        let chunks = self.chunker.chunk_with_pages(
            &extraction.text,
            &extraction.pages,
            settings.target_chunk_size,
            settings.overlap,
        );
        stage.report("Chunking text", 100);

        tracing::info!(
            "Processed {}: {} pages, {} chunks, doi={:?}, isbn={:?}",
            source_id,
            extraction.processed_pages,
            chunks.len(),
            identifiers.doi,
            identifiers.isbn
        );

        Ok(PipelineResult {
            text: extraction.text,
            chunks,
            identifiers,
            pages: extraction.pages,
            total_pages: extraction.total_pages,
            processed_pages: extraction.processed_pages,
        })
    }

    fn discover_identifiers(
        &self,
        extraction: &ExtractionResult,
        source_id: &str,
        settings: &ProcessingSettings,
        progress: &dyn ProgressSink,
    ) -> IdentifierResult {
        if !settings.extract_identifiers {
            return IdentifierResult::default();
        }
        let stage = StageProgress::new(progress, IDENTIFY_BAND.0, IDENTIFY_BAND.1);
        stage.report("Discovering identifiers", 0);
        let identifiers = self.finder.find_in_pages(extraction, Some(source_id));
        stage.report("Discovering identifiers", 100);
        identifiers
    }

    /// Reject above the hard limit, warn once above the soft threshold
    fn enforce_size_policy(
        &self,
        path: &Path,
        settings: &ProcessingSettings,
        progress: &dyn ProgressSink,
    ) -> Result<()> {
        let meta = std::fs::metadata(path).map_err(|e| {
            PipelineError::Validation(format!("Cannot stat {}: {}", path.display(), e))
        })?;

        let size = meta.len();
        if size == 0 {
            return Err(PipelineError::Validation(format!(
                "{} is empty",
                path.display()
            )));
        }
        if size > settings.max_file_size {
            return Err(PipelineError::Validation(format!(
                "{} is {} bytes, above the {} byte limit",
                path.display(),
                size,
                settings.max_file_size
            )));
        }
        if size > settings.warn_file_size {
            tracing::warn!(
                "{} is {} bytes; processing a file this large may be slow",
                path.display(),
                size
            );
            progress.report("Large file; this may take a while", 0);
        }
        Ok(())
    }
}
