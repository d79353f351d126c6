//! Thread-safe document wrapper for MuPDF
//!
//! MuPDF documents are not thread-safe. This wrapper:
//!
//! 1. Stores the document data (bytes or path)
//! 2. Opens a fresh document for each operation
//! 3. Uses `parking_lot::Mutex` to serialize access
//!
//! Opening fresh per operation also gives the pipeline its cleanup
//! guarantee: no MuPDF handle outlives the closure that used it, so every
//! exit path (success, error, cancellation at an await point) leaves the
//! underlying file closed.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use mupdf::{Colorspace, Document, Matrix};
use parking_lot::Mutex;

use crate::error::{PipelineError, Result};

/// Leading byte signature every well-formed PDF starts with
pub const PDF_MAGIC: &[u8] = b"%PDF-";

/// Source data for a document
#[derive(Clone, Debug)]
pub enum DocumentSource {
    /// Document loaded from owned bytes
    Bytes(Arc<Vec<u8>>),
    /// Document loaded from a file path
    Path(PathBuf),
}

impl DocumentSource {
    /// Create source from bytes
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self::Bytes(Arc::new(data))
    }

    /// Create source from path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        Self::Path(path.as_ref().to_path_buf())
    }

    /// Identifier used in error context and logs
    pub fn id(&self) -> String {
        match self {
            Self::Bytes(data) => format!("<{} bytes>", data.len()),
            Self::Path(path) => path.display().to_string(),
        }
    }

    /// Check the leading byte signature without opening the parser.
    ///
    /// For file-backed sources only the first few bytes are read.
    pub fn validate_signature(&self) -> Result<()> {
        let mut head = [0u8; 8];
        let read = match self {
            Self::Bytes(data) => {
                let n = data.len().min(head.len());
                head[..n].copy_from_slice(&data[..n]);
                n
            }
            Self::Path(path) => {
                let mut file = std::fs::File::open(path).map_err(|e| {
                    PipelineError::Validation(format!(
                        "Cannot read {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                file.read(&mut head)?
            }
        };

        if read < PDF_MAGIC.len() || &head[..PDF_MAGIC.len()] != PDF_MAGIC {
            return Err(PipelineError::Validation(format!(
                "{} is not a PDF (bad header)",
                self.id()
            )));
        }
        Ok(())
    }
}

/// Thread-safe document wrapper
///
/// Serializes all access to MuPDF documents. The document is opened fresh
/// for each operation to avoid stale state.
#[derive(Debug)]
pub struct SafeDocument {
    source: DocumentSource,
    /// Cached page count
    page_count: usize,
    /// Mutex for serializing access
    _lock: Mutex<()>,
}

// SAFETY: all fields except _lock are immutable after construction
// (Arc<Vec<u8>>, PathBuf, usize are Send + Sync). Every MuPDF operation
// goes through with_doc, which acquires _lock, opens a fresh
// Document inside the closure scope, and drops it before returning. No
// document reference escapes, so serialized access is guaranteed.
unsafe impl Send for SafeDocument {}
unsafe impl Sync for SafeDocument {}

impl SafeDocument {
    /// Open a document, validating the signature first.
    ///
    /// Returns `Validation` for a bad header and `Resource` when MuPDF
    /// cannot open or count pages.
    pub fn open(source: DocumentSource) -> Result<Self> {
        source.validate_signature()?;

        let doc = Self::open_document(&source)?;
        let page_count = doc
            .page_count()
            .map_err(|e| PipelineError::Resource(format!("Cannot count pages: {}", e)))?
            as usize;

        Ok(Self {
            source,
            page_count,
            _lock: Mutex::new(()),
        })
    }

    /// Number of pages in the document
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Identifier used in error context and logs
    pub fn id(&self) -> String {
        self.source.id()
    }

    fn open_document(source: &DocumentSource) -> Result<Document> {
        match source {
            DocumentSource::Bytes(data) => {
                Document::from_bytes(data, "application/pdf").map_err(Into::into)
            }
            DocumentSource::Path(path) => {
                let path_str = path.to_string_lossy();
                Document::open(&*path_str).map_err(Into::into)
            }
        }
    }

    /// Execute a closure with access to a freshly opened document.
    ///
    /// Access is serialized via mutex; the document is dropped when the
    /// closure returns.
    pub fn with_doc<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Document) -> Result<R>,
    {
        let _guard = self._lock.lock();
        let doc = Self::open_document(&self.source)?;
        f(&doc)
    }

    /// Extract plain text and dimensions for a single page.
    ///
    /// Returns `(width, height, text)` in PDF points.
    pub fn page_text(&self, page_index: usize) -> Result<(f32, f32, String)> {
        self.with_doc(|doc| {
            let page = doc.load_page(page_index as i32)?;
            let bounds = page.bounds()?;
            let width = bounds.x1 - bounds.x0;
            let height = bounds.y1 - bounds.y0;
            let text = page.to_text()?;
            Ok((width, height, text))
        })
    }

    /// Render a page to a PNG at the given scale.
    ///
    /// Used to hand low-yield pages to the recognition engine.
    pub fn render_page_png(&self, page_index: usize, scale: f32) -> Result<Vec<u8>> {
        self.with_doc(|doc| {
            let page = doc.load_page(page_index as i32)?;
            let matrix = Matrix::new_scale(scale, scale);
            let colorspace = Colorspace::device_rgb();
            let pixmap = page.to_pixmap(&matrix, &colorspace, true, false)?;
            encode_pixmap_png(&pixmap)
        })
    }
}

fn encode_pixmap_png(pixmap: &mupdf::Pixmap) -> Result<Vec<u8>> {
    let width = pixmap.width();
    let height = pixmap.height();
    let samples = pixmap.samples();
    let n = pixmap.n() as usize;

    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height as usize {
        for x in 0..width as usize {
            let offset = (y * width as usize + x) * n;
            let r = samples.get(offset).copied().unwrap_or(0);
            let g = samples.get(offset + 1).copied().unwrap_or(0);
            let b = samples.get(offset + 2).copied().unwrap_or(0);
            let a = if n >= 4 {
                samples.get(offset + 3).copied().unwrap_or(255)
            } else {
                255
            };
            rgba.extend_from_slice(&[r, g, b, a]);
        }
    }

    let img = image::RgbaImage::from_raw(width, height, rgba).ok_or_else(|| {
        PipelineError::Resource("Failed to build image buffer from pixmap".to_string())
    })?;

    let mut output = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(
            &mut std::io::Cursor::new(&mut output),
            image::ImageFormat::Png,
        )
        .map_err(|e| PipelineError::Resource(format!("PNG encode failed: {}", e)))?;

    Ok(output)
}
