mod assemble;
mod document;
mod page_index;
mod render;

pub use assemble::MergedDocument;
pub use document::PdfDocument;
pub use page_index::PageIndex;
pub use render::PageRenderer;
