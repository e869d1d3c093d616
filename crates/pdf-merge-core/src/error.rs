use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for pdf-merge-core
///
/// This enum encompasses all error cases that can occur in the library:
/// - Merger misuse (missing inputs, nothing to merge)
/// - Rasterization operations (opening, rendering, encoding, saving)
/// - Configuration operations (loading, validation)
/// - General I/O operations
#[derive(Error, Debug)]
pub enum Error {
    // ==========================================================================
    // Merger Errors
    // ==========================================================================
    /// Path passed to `add` does not reference an existing file
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// `generate` called before any file was added
    #[error("no files defined to merge")]
    NoFilesDefined,

    // ==========================================================================
    // PDF Errors
    // ==========================================================================
    /// Failed to open or parse a PDF file
    #[error("failed to open PDF: {0}")]
    PdfOpen(String),

    /// Invalid page number requested
    #[error("invalid page number {page} (document has {total} pages)")]
    PdfInvalidPage { page: usize, total: usize },

    /// Failed to render a PDF page
    #[error("failed to render page {page}: {reason}")]
    PdfRender { page: usize, reason: String },

    /// Failed to encode a rendered page for embedding
    #[error("failed to encode page image: {0}")]
    PdfEncode(String),

    /// Failed to save a PDF
    #[error("failed to save PDF: {0}")]
    PdfSave(String),

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Failed to load configuration file
    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    /// Invalid configuration value
    #[error("invalid config value for '{field}': {reason}")]
    ConfigInvalid { field: String, reason: String },

    // ==========================================================================
    // I/O Errors
    // ==========================================================================
    /// General I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
