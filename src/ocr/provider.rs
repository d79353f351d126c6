//! OCR providers
//!
//! Defines the provider trait and implementations for the supported
//! backends. Providers are image-in, text-out; "no text found" is an
//! empty string, not an error.

use async_trait::async_trait;

use super::types::{OcrBackend, OcrError, OcrResult};

/// OCR provider trait
#[async_trait]
pub trait OcrProviderTrait: Send + Sync {
    /// Get the backend type
    fn backend(&self) -> OcrBackend;

    /// Check if the provider is available
    async fn is_available(&self) -> bool;

    /// Perform OCR on a PNG image
    async fn recognize(&self, image_data: &[u8], language: &str) -> Result<OcrResult, OcrError>;
}

/// Tesseract OCR provider (shells out to the `tesseract` CLI)
pub struct TesseractProvider;

#[async_trait]
impl OcrProviderTrait for TesseractProvider {
    fn backend(&self) -> OcrBackend {
        OcrBackend::Tesseract
    }

    async fn is_available(&self) -> bool {
        std::process::Command::new("tesseract")
            .arg("--version")
            .output()
            .is_ok()
    }

    async fn recognize(&self, image_data: &[u8], language: &str) -> Result<OcrResult, OcrError> {
        use std::process::Command;

        // Tesseract works on files; write the image to a temp path
        let temp_dir = std::env::temp_dir();
        let input_path = temp_dir.join(format!("ocr_input_{}.png", uuid::Uuid::new_v4()));
        let output_path = temp_dir.join(format!("ocr_output_{}", uuid::Uuid::new_v4()));

        std::fs::write(&input_path, image_data)
            .map_err(|e| OcrError::ProcessingError(format!("Failed to write temp file: {}", e)))?;

        let output = Command::new("tesseract")
            .arg(&input_path)
            .arg(&output_path)
            .arg("-l")
            .arg(language)
            .arg("--oem")
            .arg("3")
            .arg("--psm")
            .arg("3")
            .output();

        let _ = std::fs::remove_file(&input_path);

        let output = output
            .map_err(|e| OcrError::ProcessingError(format!("Failed to run tesseract: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::ProcessingError(format!(
                "Tesseract failed: {}",
                stderr
            )));
        }

        let output_file = format!("{}.txt", output_path.display());
        let text = std::fs::read_to_string(&output_file)
            .map_err(|e| OcrError::ProcessingError(format!("Failed to read output: {}", e)))?;

        let _ = std::fs::remove_file(&output_file);

        Ok(OcrResult {
            text: text.trim().to_string(),
            backend: OcrBackend::Tesseract,
        })
    }
}

/// Ollama vision model provider
pub struct OllamaProvider {
    /// Ollama API URL
    base_url: String,
    /// Model name (e.g., "llava", "bakllava")
    model: String,
}

impl OllamaProvider {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl OcrProviderTrait for OllamaProvider {
    fn backend(&self) -> OcrBackend {
        OcrBackend::Ollama
    }

    async fn is_available(&self) -> bool {
        let client = reqwest::Client::new();
        let url = format!("{}/api/tags", self.base_url);

        match client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn recognize(&self, image_data: &[u8], language: &str) -> Result<OcrResult, OcrError> {
        use base64::Engine;

        let client = reqwest::Client::new();
        let url = format!("{}/api/generate", self.base_url);

        let image_base64 = base64::engine::general_purpose::STANDARD.encode(image_data);

        let prompt = format!(
            "Extract all text from this image exactly as written. The text is in {}. \
             Return only the extracted text, nothing else.",
            language
        );

        let request = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "images": [image_base64],
            "stream": false
        });

        let response = client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| OcrError::ApiError(format!("Failed to call Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::ApiError(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| OcrError::ApiError(format!("Failed to parse response: {}", e)))?;

        let text = result["response"]
            .as_str()
            .unwrap_or("")
            .trim()
            .to_string();

        Ok(OcrResult {
            text,
            backend: OcrBackend::Ollama,
        })
    }
}

/// Mock provider for testing
#[cfg(test)]
pub struct MockProvider {
    pub response: OcrResult,
    pub available: bool,
    pub fail: bool,
}

#[cfg(test)]
#[async_trait]
impl OcrProviderTrait for MockProvider {
    fn backend(&self) -> OcrBackend {
        self.response.backend
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn recognize(&self, _image_data: &[u8], _language: &str) -> Result<OcrResult, OcrError> {
        if self.fail {
            return Err(OcrError::ProcessingError("mock failure".into()));
        }
        Ok(self.response.clone())
    }
}
