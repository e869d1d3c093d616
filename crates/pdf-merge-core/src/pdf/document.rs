use std::path::{Path, PathBuf};

use mupdf::{Document as MuDocument, Page};

use crate::error::{Error, Result};
use super::page_index::PageIndex;

/// An opened source document ready for rendering.
///
/// Owns the underlying MuPDF handle; dropping the value releases it.
pub struct PdfDocument {
    inner: MuDocument,
    /// Number of pages
    page_count: usize,
    /// File the document was loaded from, if any
    source: Option<PathBuf>,
}

impl PdfDocument {
    /// Open a PDF from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let inner = MuDocument::from_bytes(bytes, "")
            .map_err(|e| Error::PdfOpen(format!("Failed to parse PDF: {e}")))?;

        let page_count = inner
            .page_count()
            .map_err(|e| Error::PdfOpen(format!("Failed to get page count: {e}")))?;

        Ok(Self {
            inner,
            page_count: usize::try_from(page_count).unwrap_or(0),
            source: None,
        })
    }

    /// Open a PDF from a file path
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            Error::PdfOpen(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        let mut doc = Self::from_bytes(&bytes).map_err(|e| match e {
            Error::PdfOpen(reason) => Error::PdfOpen(format!("{}: {reason}", path.display())),
            other => other,
        })?;
        doc.source = Some(path.to_path_buf());
        Ok(doc)
    }

    /// Get number of pages
    pub const fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Load a single page for rendering
    pub(crate) fn load_page(&self, index: PageIndex) -> Result<Page> {
        self.inner.load_page(index.into()).map_err(|e| Error::PdfRender {
            page: index.as_usize(),
            reason: format!("Failed to load page: {e}"),
        })
    }
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("page_count", &self.page_count)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}
