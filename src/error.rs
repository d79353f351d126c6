//! Pipeline error types
//!
//! Unified error handling for the ingestion pipeline. Only `Validation`
//! and `Resource` (wrapped with stage context) ever reach callers; OCR
//! failures and chunking timeouts are recovered internally.

use thiserror::Error;

/// Pipeline error type
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Bad input: missing file, wrong signature, empty or oversized file
    #[error("Validation error: {0}")]
    Validation(String),

    /// The underlying parsing library could not open or read the document
    #[error("Resource error: {0}")]
    Resource(String),

    /// IO error (std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A stage failed; carries enough context to diagnose without the
    /// original stack
    #[error("Stage '{stage}' failed for {source_id}: {inner}")]
    Stage {
        /// Pipeline stage name
        stage: &'static str,
        /// Identifier of the source document
        source_id: String,
        /// The wrapped error
        #[source]
        inner: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Wrap this error with pipeline stage context
    pub fn with_stage(self, stage: &'static str, source_id: impl Into<String>) -> Self {
        PipelineError::Stage {
            stage,
            source_id: source_id.into(),
            inner: Box::new(self),
        }
    }

    /// Machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Validation(_) => "validation",
            PipelineError::Resource(_) => "resource",
            PipelineError::Io(_) => "io",
            PipelineError::Stage { inner, .. } => inner.kind(),
        }
    }
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

impl From<mupdf::Error> for PipelineError {
    fn from(err: mupdf::Error) -> Self {
        PipelineError::Resource(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_wrapping_preserves_kind() {
        let err = PipelineError::Validation("not a PDF".into())
            .with_stage("extraction", "sample.pdf");
        assert_eq!(err.kind(), "validation");
        let msg = err.to_string();
        assert!(msg.contains("extraction"));
        assert!(msg.contains("sample.pdf"));
    }

    #[test]
    fn test_resource_kind() {
        let err = PipelineError::Resource("cannot open".into());
        assert_eq!(err.kind(), "resource");
    }
}
