use image::RgbImage;
use mupdf::{Colorspace, Matrix};

use crate::config::Density;
use crate::error::{Error, Result};
use super::document::PdfDocument;
use super::page_index::PageIndex;

/// Page renderer for PDF documents
pub struct PageRenderer<'a> {
    /// The PDF document to render
    pub doc: &'a PdfDocument,
    /// Resolution pages are rasterized at
    pub density: Density,
}

impl<'a> PageRenderer<'a> {
    /// Create a renderer at the default density (72 DPI)
    pub fn new(doc: &'a PdfDocument) -> Self {
        Self {
            doc,
            density: Density::default(),
        }
    }

    pub const fn with_density(doc: &'a PdfDocument, density: Density) -> Self {
        Self { doc, density }
    }

    /// Render a page to an opaque RGB image buffer
    pub fn render_page(&self, index: PageIndex) -> Result<RgbImage> {
        let page_num = index.as_usize();
        let page = self.doc.load_page(index)?;

        let scale = self.density.scale();
        let matrix = Matrix::new_scale(scale, scale);

        // No alpha channel: mupdf paints onto a white background
        let pixmap = page
            .to_pixmap(&matrix, &Colorspace::device_rgb(), 0.0, true)
            .map_err(|e| Error::PdfRender {
                page: page_num,
                reason: format!("Failed to render: {e}"),
            })?;

        let img_width = pixmap.width();
        let img_height = pixmap.height();
        let n = pixmap.n() as usize;
        let rgb_pixels = samples_to_rgb(pixmap.samples(), n).ok_or_else(|| Error::PdfRender {
            page: page_num,
            reason: format!("Unexpected pixel format with {n} components"),
        })?;

        RgbImage::from_raw(img_width, img_height, rgb_pixels).ok_or_else(|| Error::PdfRender {
            page: page_num,
            reason: "Failed to create image buffer".to_string(),
        })
    }
}

/// Convert interleaved pixmap samples with `n` components per pixel to RGB.
///
/// Alpha, when present, is premultiplied and composited onto white.
fn samples_to_rgb(samples: &[u8], n: usize) -> Option<Vec<u8>> {
    if !matches!(n, 1 | 3 | 4) {
        return None;
    }

    let mut rgb = Vec::with_capacity(samples.len() / n * 3);
    for chunk in samples.chunks_exact(n) {
        match n {
            1 => rgb.extend_from_slice(&[chunk[0], chunk[0], chunk[0]]),
            3 => rgb.extend_from_slice(chunk),
            _ => {
                let backdrop = 255 - chunk[3];
                rgb.extend(chunk[..3].iter().map(|&c| c.saturating_add(backdrop)));
            }
        }
    }
    Some(rgb)
}
