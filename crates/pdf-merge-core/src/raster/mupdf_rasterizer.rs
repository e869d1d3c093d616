use std::path::Path;

use tracing::trace;

use crate::config::MergeOptions;
use crate::error::Result;
use crate::pdf::{MergedDocument, PageIndex, PageRenderer, PdfDocument};
use super::traits::Rasterizer;

/// Rasterizer rendering pages with MuPDF and assembling the output with lopdf
#[derive(Debug, Clone, Copy, Default)]
pub struct MupdfRasterizer;

impl MupdfRasterizer {
    pub const fn new() -> Self {
        Self
    }
}

impl Rasterizer for MupdfRasterizer {
    type Source = PdfDocument;
    type Output = MergedDocument;

    fn name(&self) -> &'static str {
        "mupdf"
    }

    fn load(&self, path: &Path) -> Result<PdfDocument> {
        PdfDocument::from_file(path)
    }

    fn page_count(&self, source: &PdfDocument) -> usize {
        source.page_count()
    }

    fn begin(&self, _options: &MergeOptions) -> Result<MergedDocument> {
        Ok(MergedDocument::new())
    }

    fn append_page(
        &self,
        output: &mut MergedDocument,
        source: &PdfDocument,
        page: PageIndex,
        options: &MergeOptions,
    ) -> Result<()> {
        let renderer = PageRenderer::with_density(source, options.effective_density());
        let image = renderer.render_page(page)?;
        trace!(
            "Rendered page {} of {} at {} DPI ({}x{} px)",
            page,
            source.source().unwrap_or_else(|| Path::new("<memory>")).display(),
            renderer.density,
            image.width(),
            image.height()
        );
        output.append_image_page(&image, options)?;
        Ok(())
    }

    fn write(&self, output: MergedDocument, path: &Path) -> Result<()> {
        output.save(path)
    }
}
