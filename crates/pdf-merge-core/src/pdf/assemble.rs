//! Output document assembly.
//!
//! Every rendered page becomes one PDF page holding a single image XObject
//! drawn over the full MediaBox. The MediaBox is the pixel size converted back
//! to points at the rendering density, so the physical page size is kept while
//! the pixel resolution follows the configured density.

use std::fmt;
use std::io::Write;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tempfile::NamedTempFile;

use crate::config::{ColorMode, MergeOptions, POINTS_PER_INCH};
use crate::error::{Error, Result};

/// Resource name of the page image inside each page's XObject dictionary
const PAGE_IMAGE_NAME: &str = "Im0";

/// Accumulator that collects rendered pages into one PDF.
pub struct MergedDocument {
    document: Document,
    /// Reserved id of the page tree root; written on finish
    pages_id: ObjectId,
    kids: Vec<ObjectId>,
}

impl MergedDocument {
    pub fn new() -> Self {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();
        Self {
            document,
            pages_id,
            kids: Vec::new(),
        }
    }

    /// Number of pages appended so far
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append one rendered page, encoded according to `options`.
    pub fn append_image_page(&mut self, image: &RgbImage, options: &MergeOptions) -> Result<ObjectId> {
        let (width, height) = image.dimensions();
        let image_id = self.add_image(image, options)?;

        let density = options.effective_density().dpi();
        #[allow(clippy::cast_precision_loss)]
        let (page_width, page_height) = (
            width as f32 * POINTS_PER_INCH / density,
            height as f32 * POINTS_PER_INCH / density,
        );

        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        Object::Real(page_width),
                        0.into(),
                        0.into(),
                        Object::Real(page_height),
                        0.into(),
                        0.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(PAGE_IMAGE_NAME.as_bytes().to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_bytes = content
            .encode()
            .map_err(|e| Error::PdfEncode(format!("Failed to encode page content: {e}")))?;
        let content_id = self
            .document
            .add_object(Stream::new(Dictionary::new(), content_bytes));

        let resources = Dictionary::from_iter([(
            "XObject",
            Object::Dictionary(Dictionary::from_iter([(
                PAGE_IMAGE_NAME,
                Object::Reference(image_id),
            )])),
        )]);

        let page_id = self.document.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(self.pages_id)),
            ("Contents", Object::Reference(content_id)),
            ("Resources", Object::Dictionary(resources)),
            (
                "MediaBox",
                Object::Array(vec![
                    0.into(),
                    0.into(),
                    Object::Real(page_width),
                    Object::Real(page_height),
                ]),
            ),
        ]));

        self.kids.push(page_id);
        Ok(page_id)
    }

    /// Add the image XObject for a page
    fn add_image(&mut self, image: &RgbImage, options: &MergeOptions) -> Result<ObjectId> {
        let (width, height) = image.dimensions();

        let (samples, color_type) = match options.colorspace {
            ColorMode::Rgb => (image.as_raw().clone(), ExtendedColorType::Rgb8),
            ColorMode::Gray => (
                image::imageops::grayscale(image).into_raw(),
                ExtendedColorType::L8,
            ),
        };

        let mut dict = Dictionary::from_iter([
            ("Type", Object::Name(b"XObject".to_vec())),
            ("Subtype", Object::Name(b"Image".to_vec())),
            ("Width", Object::Integer(i64::from(width))),
            ("Height", Object::Integer(i64::from(height))),
            ("ColorSpace", Object::Name(options.colorspace.pdf_name().to_vec())),
            ("BitsPerComponent", Object::Integer(8)),
        ]);

        let stream = if let Some(quality) = options.quality {
            let mut jpeg = Vec::new();
            JpegEncoder::new_with_quality(&mut jpeg, quality)
                .write_image(&samples, width, height, color_type)
                .map_err(|e| Error::PdfEncode(format!("Failed to encode JPEG: {e}")))?;
            dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
            // Already compressed; keep lopdf from wrapping it in Flate
            Stream::new(dict, jpeg).with_compression(false)
        } else {
            // Deflated on append: the accumulator holds no raw samples
            let mut stream = Stream::new(dict, samples);
            stream
                .compress()
                .map_err(|e| Error::PdfEncode(format!("Failed to compress image: {e}")))?;
            stream
        };

        Ok(self.document.add_object(stream))
    }

    /// Build the page tree and catalog, returning the finished document
    fn finish(self) -> Document {
        let Self {
            mut document,
            pages_id,
            kids,
        } = self;

        #[allow(clippy::cast_possible_wrap)]
        let count = kids.len() as i64;
        let pages = Dictionary::from_iter([
            ("Type", Object::Name(b"Pages".to_vec())),
            (
                "Kids",
                Object::Array(kids.into_iter().map(Object::Reference).collect()),
            ),
            ("Count", Object::Integer(count)),
        ]);
        document.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = document.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        document.trailer.set("Root", Object::Reference(catalog_id));

        document.compress();
        document
    }

    /// Serialize the document to bytes
    pub fn to_bytes(self) -> Result<Vec<u8>> {
        let mut document = self.finish();
        let mut output = Vec::new();
        document
            .save_to(&mut output)
            .map_err(|e| Error::PdfSave(format!("Failed to save merged PDF: {e}")))?;
        Ok(output)
    }

    /// Write the document to `path`.
    ///
    /// The bytes go to a temporary file next to `path` that is renamed into
    /// place once fully written, so a failed write never leaves a truncated file.
    pub fn save(self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut file = NamedTempFile::new_in(dir).map_err(|e| save_error(path, e))?;
        file.write_all(&bytes).map_err(|e| save_error(path, e))?;
        file.persist(path).map_err(|e| save_error(path, e.error))?;
        Ok(())
    }
}

fn save_error(path: &Path, e: impl fmt::Display) -> Error {
    Error::PdfSave(format!("Failed to write {}: {e}", path.display()))
}

impl Default for MergedDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MergedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MergedDocument")
            .field("page_count", &self.kids.len())
            .finish_non_exhaustive()
    }
}
