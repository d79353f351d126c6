//! OCR types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OCR backend identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackend {
    /// Local Tesseract CLI
    Tesseract,
    /// Local Ollama vision model
    Ollama,
}

/// Result of recognizing one image
#[derive(Debug, Clone)]
pub struct OcrResult {
    /// Recognized text; empty when the image contains no readable text
    pub text: String,
    /// Backend that produced the text
    pub backend: OcrBackend,
}

/// OCR error type
///
/// These never propagate past the extractor: a failed page recovery is
/// logged and treated as "no recovery".
#[derive(Debug, Error)]
pub enum OcrError {
    /// No configured backend is available
    #[error("No OCR backend available")]
    Unavailable,

    /// Backend process or filesystem failure
    #[error("OCR processing error: {0}")]
    ProcessingError(String),

    /// Remote backend API failure
    #[error("OCR API error: {0}")]
    ApiError(String),
}
