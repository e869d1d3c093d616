use std::path::Path;

use crate::config::MergeOptions;
use crate::error::Result;
use crate::pdf::PageIndex;

/// Capability that decodes page-based documents and re-encodes their pages
/// into one output document.
///
/// Errors are returned as-is; callers propagate them without translation.
pub trait Rasterizer {
    /// A loaded input document
    type Source;

    /// The output document being accumulated
    type Output;

    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Load a document from `path`
    fn load(&self, path: &Path) -> Result<Self::Source>;

    /// Number of pages in a loaded document
    fn page_count(&self, source: &Self::Source) -> usize;

    /// Start an empty output document
    fn begin(&self, options: &MergeOptions) -> Result<Self::Output>;

    /// Render one page of `source` and append it to `output`
    fn append_page(
        &self,
        output: &mut Self::Output,
        source: &Self::Source,
        page: PageIndex,
        options: &MergeOptions,
    ) -> Result<()>;

    /// Write the accumulated document to `path`
    fn write(&self, output: Self::Output, path: &Path) -> Result<()>;
}
