//! Processing settings
//!
//! Caller-supplied configuration for one `process` invocation. Explicit
//! typed fields with documented defaults, validated once at pipeline
//! entry.

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Default target chunk size in characters
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Default overlap between adjacent chunks in characters
pub const DEFAULT_OVERLAP: usize = 100;
/// Hard file-size limit (50 MB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
/// Soft file-size warning threshold (20 MB)
pub const DEFAULT_WARN_FILE_SIZE: u64 = 20 * 1024 * 1024;

/// Configuration for a single pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingSettings {
    /// Maximum number of pages to extract (0 = all pages)
    pub max_pages: usize,
    /// Attempt OCR recovery on low-yield pages
    pub enable_recognition: bool,
    /// Target chunk size in characters
    pub target_chunk_size: usize,
    /// Overlap between adjacent chunks in characters
    pub overlap: usize,
    /// Run DOI/ISBN discovery over the extracted text
    pub extract_identifiers: bool,
    /// Hard file-size limit in bytes; larger inputs are rejected
    pub max_file_size: u64,
    /// Soft file-size threshold in bytes; larger inputs log a warning
    pub warn_file_size: u64,
}

impl Default for ProcessingSettings {
    fn default() -> Self {
        Self {
            max_pages: 0,
            enable_recognition: true,
            target_chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_OVERLAP,
            extract_identifiers: true,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            warn_file_size: DEFAULT_WARN_FILE_SIZE,
        }
    }
}

impl ProcessingSettings {
    /// Validate the settings. Called once at pipeline entry.
    pub fn validate(&self) -> Result<()> {
        if self.target_chunk_size == 0 {
            return Err(PipelineError::Validation(
                "target_chunk_size must be positive".into(),
            ));
        }
        if self.overlap >= self.target_chunk_size {
            return Err(PipelineError::Validation(format!(
                "overlap ({}) must be smaller than target_chunk_size ({})",
                self.overlap, self.target_chunk_size
            )));
        }
        if self.max_file_size == 0 {
            return Err(PipelineError::Validation(
                "max_file_size must be positive".into(),
            ));
        }
        if self.warn_file_size > self.max_file_size {
            return Err(PipelineError::Validation(format!(
                "warn_file_size ({}) must not exceed max_file_size ({})",
                self.warn_file_size, self.max_file_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ProcessingSettings::default().validate().is_ok());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk_size() {
        let settings = ProcessingSettings {
            target_chunk_size: 100,
            overlap: 100,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(PipelineError::Validation(_))
        ));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let settings = ProcessingSettings {
            target_chunk_size: 0,
            overlap: 0,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_warn_threshold_above_hard_limit_rejected() {
        let settings = ProcessingSettings {
            max_file_size: 1024,
            warn_file_size: 2048,
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
