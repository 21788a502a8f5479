use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::RgbImage;
use gc_core::frame::Grid;
use rayon::prelude::*;

use crate::error::EncodeError;
use crate::glyphs::GlyphAtlas;

/// Codecs raster disponibles.
///
/// # Example
/// ```
/// use gc_export::raster::RasterCodec;
/// assert_eq!(RasterCodec::from_name("PNG", 90).unwrap(), RasterCodec::Png);
/// assert_eq!(RasterCodec::from_name("jpg", 75).unwrap(), RasterCodec::Jpeg { quality: 75 });
/// assert!(RasterCodec::from_name("tiff", 90).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RasterCodec {
    /// Sans perte.
    Png,
    /// Sans perte, non compressé.
    Bmp,
    /// Avec perte, qualité 1–100.
    Jpeg { quality: u8 },
}

impl RasterCodec {
    /// Resolve a codec from a name or file extension.
    ///
    /// # Errors
    /// [`EncodeError::UnsupportedCodec`] for anything but png/bmp/jpg/jpeg.
    pub fn from_name(name: &str, jpeg_quality: u8) -> Result<Self, EncodeError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "bmp" => Ok(Self::Bmp),
            "jpg" | "jpeg" => Ok(Self::Jpeg {
                quality: jpeg_quality,
            }),
            other => Err(EncodeError::UnsupportedCodec(other.to_string())),
        }
    }

    /// Extension de fichier canonique.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::Jpeg { .. } => "jpg",
        }
    }
}

/// Dessine une grille en image RGB puis l'encode.
///
/// Canvas : `grid_w × cell_w × scale` par `grid_h × cell_h × scale`, fond
/// noir (blanc si inversé), chaque glyphe peint avec sa couleur finale.
pub struct RasterEncoder {
    atlas: GlyphAtlas,
}

impl RasterEncoder {
    #[must_use]
    pub fn new(atlas: GlyphAtlas) -> Self {
        Self { atlas }
    }

    /// Dimensions du canvas pour une grille et une échelle.
    #[must_use]
    pub fn canvas_size(&self, grid: &Grid, scale: u32) -> (u64, u64) {
        let (cw, ch) = self.atlas.cell_size();
        (
            u64::from(grid.width) * u64::from(cw) * u64::from(scale),
            u64::from(grid.height) * u64::from(ch) * u64::from(scale),
        )
    }

    /// Peint `grid` dans une image.
    ///
    /// # Errors
    /// [`EncodeError::EmptyCanvas`] si le canvas est de surface nulle ou
    /// dépasse les limites d'une image.
    pub fn paint(&self, grid: &Grid, scale: u32) -> Result<RgbImage, EncodeError> {
        let (w64, h64) = self.canvas_size(grid, scale);
        let empty = || EncodeError::EmptyCanvas {
            width: w64,
            height: h64,
        };
        if w64 == 0 || h64 == 0 {
            return Err(empty());
        }
        let width = u32::try_from(w64).map_err(|_| empty())?;
        let height = u32::try_from(h64).map_err(|_| empty())?;

        let (cell_w, cell_h) = self.atlas.cell_size();
        let masks = self.atlas.coverage_map(grid.cells.iter().map(|c| c.glyph));
        let background = grid.style.background();

        let stride = width as usize * 3;
        let band_rows = (cell_h * scale) as usize;
        let mut data = vec![0u8; stride * height as usize];

        data.par_chunks_exact_mut(stride * band_rows)
            .enumerate()
            .for_each(|(gy, band)| {
                for gx in 0..grid.width {
                    let cell = grid.get(gx, gy as u16);
                    let fg = grid.color_at(gx, gy as u16);
                    let mask = masks.get(&cell.glyph);
                    let x0 = usize::from(gx) * (cell_w * scale) as usize;

                    for py in 0..band_rows {
                        let my = py / scale as usize;
                        let row = &mut band[py * stride..(py + 1) * stride];
                        for px in 0..(cell_w * scale) as usize {
                            let mx = px / scale as usize;
                            let alpha = mask.map_or(0, |m| m[my * cell_w as usize + mx]);
                            let out = &mut row[(x0 + px) * 3..(x0 + px) * 3 + 3];
                            out[0] = blend(fg.0, background.0, alpha);
                            out[1] = blend(fg.1, background.1, alpha);
                            out[2] = blend(fg.2, background.2, alpha);
                        }
                    }
                }
            });

        RgbImage::from_raw(width, height, data).ok_or_else(empty)
    }

    /// Peint puis encode `grid` avec `codec`.
    ///
    /// # Errors
    /// [`EncodeError::EmptyCanvas`] pour un canvas vide,
    /// [`EncodeError::Image`] si le codec échoue.
    ///
    /// # Example
    /// ```
    /// use gc_export::glyphs::GlyphAtlas;
    /// use gc_export::raster::{RasterCodec, RasterEncoder};
    /// use gc_core::frame::Grid;
    ///
    /// let encoder = RasterEncoder::new(GlyphAtlas::builtin(10));
    /// let png = encoder.encode(&Grid::from_glyph_rows(&["ab", "cd"]).unwrap(), 1, RasterCodec::Png).unwrap();
    /// assert_eq!(&png[1..4], b"PNG");
    /// ```
    pub fn encode(&self, grid: &Grid, scale: u32, codec: RasterCodec) -> Result<Vec<u8>, EncodeError> {
        let img = self.paint(grid, scale)?;
        let mut buf = Vec::new();
        match codec {
            RasterCodec::Png => img.write_with_encoder(PngEncoder::new(&mut buf))?,
            RasterCodec::Bmp => img.write_with_encoder(BmpEncoder::new(&mut buf))?,
            RasterCodec::Jpeg { quality } => {
                let q = quality.clamp(1, 100);
                img.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, q))?;
            }
        }
        log::debug!(
            "Raster {}: {}x{} → {} octets",
            codec.extension(),
            img.width(),
            img.height(),
            buf.len()
        );
        Ok(buf)
    }
}

/// `fg` sur `bg` avec une couverture 0–255, arrondi.
#[inline(always)]
fn blend(fg: u8, bg: u8, alpha: u8) -> u8 {
    let a = u32::from(alpha);
    ((u32::from(fg) * a + u32::from(bg) * (255 - a) + 127) / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use gc_core::color::{ColorStyle, dot_blend, invert_rgb};
    use gc_core::frame::Cell;

    fn encoder() -> RasterEncoder {
        RasterEncoder::new(GlyphAtlas::builtin(6))
    }

    #[test]
    fn canvas_dimensions_follow_scale() {
        let grid = Grid::from_glyph_rows(&["abc", "def"]).unwrap();
        for scale in 1..=3 {
            let img = encoder().paint(&grid, scale).unwrap();
            assert_eq!(img.width(), 3 * 8 * scale);
            assert_eq!(img.height(), 2 * 10 * scale);
        }
    }

    #[test]
    fn background_black_then_white_when_inverted() {
        let mut grid = Grid::from_glyph_rows(&["  "]).unwrap();
        let img = encoder().paint(&grid, 1).unwrap();
        assert!(img.pixels().all(|p| p.0 == [0, 0, 0]));

        grid.style = ColorStyle {
            invert: true,
            ..ColorStyle::default()
        };
        let img = encoder().paint(&grid, 1).unwrap();
        assert!(img.pixels().all(|p| p.0 == [255, 255, 255]));
    }

    #[test]
    fn glyph_painted_with_cell_color() {
        let mut grid = Grid::new(1, 1);
        grid.style.use_color = true;
        grid.set(0, 0, Cell {
            glyph: '█',
            luminance: 10.0,
            color: (200, 10, 30),
        });
        let img = encoder().paint(&grid, 2).unwrap();
        assert_eq!(img.get_pixel(0, 0).0, [200, 10, 30]);
        assert_eq!(img.get_pixel(15, 15).0, [200, 10, 30]);
        // interligne sous le glyphe
        assert_eq!(img.get_pixel(0, 19).0, [0, 0, 0]);
    }

    #[test]
    fn inverted_dot_cell_follows_layering_order() {
        let mut grid = Grid::new(1, 1);
        grid.style = ColorStyle {
            use_color: true,
            invert: true,
            dot_mode: true,
        };
        grid.set(0, 0, Cell {
            glyph: '•',
            luminance: 200.0,
            color: (128, 128, 128),
        });
        let expected = invert_rgb(dot_blend((128, 128, 128), 200.0, true));
        assert_eq!(expected, (27, 27, 27));

        let enc = encoder();
        let mask = enc.atlas.coverage('•');
        let (cell_w, _) = enc.atlas.cell_size();
        let ink = mask.iter().position(|&a| a == 255).unwrap() as u32;
        let img = enc.paint(&grid, 1).unwrap();
        assert_eq!(
            img.get_pixel(ink % cell_w, ink / cell_w).0,
            [expected.0, expected.1, expected.2]
        );
        // fond blanc autour du point
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255]);
    }

    #[test]
    fn empty_grid_rejected() {
        let grid = Grid::new(0, 0);
        assert!(matches!(
            encoder().encode(&grid, 1, RasterCodec::Png),
            Err(EncodeError::EmptyCanvas { .. })
        ));
    }

    #[test]
    fn zero_scale_rejected() {
        let grid = Grid::from_glyph_rows(&["a"]).unwrap();
        assert!(matches!(
            encoder().encode(&grid, 0, RasterCodec::Bmp),
            Err(EncodeError::EmptyCanvas { .. })
        ));
    }

    #[test]
    fn codecs_produce_their_signatures() {
        let grid = Grid::from_glyph_rows(&["@#", ".:"]).unwrap();
        let enc = encoder();
        let png = enc.encode(&grid, 1, RasterCodec::Png).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let bmp = enc.encode(&grid, 1, RasterCodec::Bmp).unwrap();
        assert_eq!(&bmp[..2], b"BM");
        let jpg = enc.encode(&grid, 1, RasterCodec::Jpeg { quality: 0 }).unwrap();
        assert_eq!(&jpg[..2], [0xFF, 0xD8]);
    }

    #[test]
    fn png_is_lossless() {
        let mut grid = Grid::new(2, 1);
        grid.style.use_color = true;
        grid.set(1, 0, Cell {
            glyph: '█',
            luminance: 0.0,
            color: (1, 2, 3),
        });
        let enc = encoder();
        let painted = enc.paint(&grid, 1).unwrap();
        let png = enc.encode(&grid, 1, RasterCodec::Png).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(decoded, painted);
    }

    #[test]
    fn blend_extremes() {
        assert_eq!(blend(200, 0, 255), 200);
        assert_eq!(blend(200, 0, 0), 0);
        assert_eq!(blend(255, 0, 128), 128);
    }
}
