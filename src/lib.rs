//! Palimpsest
//!
//! A document-ingestion pipeline: page-accurate PDF text extraction
//! with character-position bookkeeping, optional OCR recovery for
//! low-yield pages, overlap-aware chunking, and bibliographic
//! identifier discovery.
//!
//! # Modules
//!
//! - `pipeline`: Orchestrator tying the stages together
//! - `extract`: Page-by-page text extraction with position bookkeeping
//! - `chunk`: Fixed-window and structure-aware chunking
//! - `identify`: DOI/ISBN discovery
//! - `ocr`: Optical recognition backends (Tesseract CLI, Ollama)

pub mod cache;
pub mod chunk;
pub mod error;
pub mod extract;
pub mod identify;
pub mod ocr;
pub mod pipeline;
pub mod settings;

// Low-level MuPDF wrapper that extract depends on
mod mupdf;

pub use chunk::{Chunk, Chunker};
pub use error::{PipelineError, Result};
pub use extract::{ExtractionResult, PageExtractor, PageRecord};
pub use identify::{IdentifierFinder, IdentifierResult};
pub use ocr::{RecognitionConfig, RecognitionEngine};
pub use pipeline::{NullProgress, Pipeline, PipelineResult, ProgressSink};
pub use settings::ProcessingSettings;
