/// Output encoders for glyphcam: text, raster images, PDF, and file sinks.
///
/// Every encoder reads the same [`Grid`](gc_core::frame::Grid) and the same
/// [`cell_color`](gc_core::color::cell_color), so screen, image and document
/// always agree.

pub mod error;
pub mod glyphs;
pub mod raster;
pub mod sink;
pub mod text;
pub mod vector;

use gc_core::frame::Grid;

pub use error::EncodeError;
pub use glyphs::GlyphAtlas;
pub use raster::{RasterCodec, RasterEncoder};
pub use sink::{FileSink, default_export_path};
pub use vector::{GlyphPitch, PageSize, to_vector_document};

/// Corps utilisé par [`to_raster`] quand aucun atlas n'est fourni.
pub const DEFAULT_FONT_SIZE: u32 = 10;

/// Raster avec l'atlas bitmap intégré.
///
/// Pour une police précise, passer par [`RasterEncoder`].
///
/// # Errors
/// See [`RasterEncoder::encode`].
///
/// # Example
/// ```
/// use gc_export::{to_raster, RasterCodec, EncodeError};
/// use gc_core::frame::Grid;
/// let bmp = to_raster(&Grid::from_glyph_rows(&["ab"]).unwrap(), 2, RasterCodec::Bmp).unwrap();
/// assert_eq!(&bmp[..2], b"BM");
/// assert!(matches!(to_raster(&Grid::new(0, 0), 1, RasterCodec::Png), Err(EncodeError::EmptyCanvas { .. })));
/// ```
pub fn to_raster(grid: &Grid, scale: u32, codec: RasterCodec) -> Result<Vec<u8>, EncodeError> {
    RasterEncoder::new(GlyphAtlas::builtin(DEFAULT_FONT_SIZE)).encode(grid, scale, codec)
}
