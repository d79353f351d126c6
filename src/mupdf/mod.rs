//! Low-level PDF access via MuPDF
//!
//! Thread-safe wrapper around MuPDF documents plus page rendering used by
//! OCR recovery. Higher layers never touch `mupdf` types directly.

mod safe;

pub use safe::{DocumentSource, SafeDocument, PDF_MAGIC};
