/// Glyph conversion engine for glyphcam.
///
/// Converts RGB frames to glyph grids: resample, luminance, contrast, quantize.
pub mod compositor;
pub mod contrast;
pub mod luminance;
pub mod quantize;

pub use compositor::{Renderer, render};
