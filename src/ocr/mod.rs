//! OCR recovery
//!
//! Optional capability wrapper around external image-to-text recognizers.
//! Never required for correctness, only completeness: when no backend is
//! available the extractor simply skips recognition.
//!
//! Supported backends:
//! - Tesseract (local CLI, requires installation)
//! - Ollama vision models (local LLM)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use palimpsest::ocr::{RecognitionEngine, RecognitionConfig};
//!
//! let engine = RecognitionEngine::detect(RecognitionConfig::default()).await;
//! if engine.can_recognize() {
//!     let text = engine.recognize(&png_bytes).await?;
//! }
//! ```

mod engine;
mod provider;
mod types;

pub use engine::{RecognitionConfig, RecognitionEngine};
pub use provider::{OcrProviderTrait, OllamaProvider, TesseractProvider};
pub use types::{OcrBackend, OcrError, OcrResult};

#[cfg(test)]
pub(crate) use provider::MockProvider;
