//! PDF Merge Core Library
//!
//! Concatenates PDF files into one document by rasterizing every page:
//! - Input collection with existence checks ([`FileSetMerger`])
//! - Page rendering at a configurable density (MuPDF)
//! - Output assembly as image-per-page PDFs (lopdf)
//! - Passthrough options loaded from TOML
//!
//! ```no_run
//! use pdf_merge_core::{FileSetMerger, MergeOptions};
//!
//! let options = MergeOptions::default().with_density("150".parse()?);
//! let mut merger = FileSetMerger::new(options);
//! merger.add("first.pdf")?;
//! merger.add("second.pdf")?;
//! merger.generate("merged.pdf")?;
//! # Ok::<(), pdf_merge_core::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod merger;
pub mod pdf;
pub mod raster;
pub mod util;

pub use config::{ColorMode, DEFAULT_DENSITY, Density, MergeOptions};
pub use error::{Error, Result};
pub use merger::{FileSetMerger, MergeReport};
pub use pdf::{MergedDocument, PageIndex, PageRenderer, PdfDocument};
pub use raster::{MupdfRasterizer, Rasterizer};

use std::path::Path;

/// Convenience function to merge `inputs`, in order, into `output`
pub fn merge_files<P: AsRef<Path>>(
    inputs: impl IntoIterator<Item = P>,
    output: impl AsRef<Path>,
    options: MergeOptions,
) -> Result<MergeReport> {
    let mut merger = FileSetMerger::new(options);
    for input in inputs {
        merger.add(input)?;
    }
    merger.generate(output)
}
