mod mupdf_rasterizer;
mod traits;

pub use mupdf_rasterizer::MupdfRasterizer;
pub use traits::Rasterizer;
