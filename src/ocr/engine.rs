//! Recognition engine
//!
//! Capability wrapper over the configured OCR providers. Availability is
//! detected once at construction; callers check `can_recognize()` and
//! skip recovery rather than fail when no backend is present.

use std::sync::Arc;

use super::provider::{OcrProviderTrait, OllamaProvider, TesseractProvider};
use super::types::{OcrError, OcrResult};

/// Recognition engine configuration
#[derive(Debug, Clone)]
pub struct RecognitionConfig {
    /// Ollama base URL
    pub ollama_url: String,
    /// Ollama model name
    pub ollama_model: String,
    /// OCR language passed to the backend
    pub language: String,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llava".to_string(),
            language: "eng".to_string(),
        }
    }
}

/// Capability wrapper around an external image-to-text recognizer
pub struct RecognitionEngine {
    /// First provider that answered the availability probe, if any
    provider: Option<Arc<dyn OcrProviderTrait>>,
    language: String,
}

impl RecognitionEngine {
    /// Probe the configured backends and keep the first available one.
    ///
    /// Tesseract is preferred over Ollama: it is cheaper and runs without
    /// a model server.
    pub async fn detect(config: RecognitionConfig) -> Self {
        let candidates: Vec<Arc<dyn OcrProviderTrait>> = vec![
            Arc::new(TesseractProvider),
            Arc::new(OllamaProvider::new(&config.ollama_url, &config.ollama_model)),
        ];

        let mut provider = None;
        for candidate in candidates {
            if candidate.is_available().await {
                tracing::info!("OCR backend available: {:?}", candidate.backend());
                provider = Some(candidate);
                break;
            }
        }

        if provider.is_none() {
            tracing::info!("No OCR backend available; recognition disabled");
        }

        Self {
            provider,
            language: config.language,
        }
    }

    /// Construct an engine with no backend (recognition always skipped)
    pub fn disabled() -> Self {
        Self {
            provider: None,
            language: String::new(),
        }
    }

    /// Whether a recognition backend is available
    pub fn can_recognize(&self) -> bool {
        self.provider.is_some()
    }

    /// Recognize text in a PNG image.
    ///
    /// Returns `Ok("")` for an image with no readable text; errors only
    /// for hard backend failures, which callers treat as single-page
    /// recovery failures.
    pub async fn recognize(&self, image_data: &[u8]) -> Result<String, OcrError> {
        let provider = self.provider.as_ref().ok_or(OcrError::Unavailable)?;
        let OcrResult { text, .. } = provider.recognize(image_data, &self.language).await?;
        Ok(text)
    }

    #[cfg(test)]
    pub(crate) fn with_provider(provider: Arc<dyn OcrProviderTrait>, language: &str) -> Self {
        Self {
            provider: Some(provider),
            language: language.to_string(),
        }
    }
}
