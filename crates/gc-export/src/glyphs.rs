use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontVec, PxScale, ScaleFont, point};
use font8x8::{BASIC_FONTS, BLOCK_FONTS, BOX_FONTS, LATIN_FONTS, UnicodeFonts};
use gc_core::charset::DOT_GLYPH;

use crate::error::EncodeError;

/// Interligne ajouté sous chaque ligne de glyphes, en pixels.
pub const LINE_GAP_PX: u32 = 2;

/// Polices monospace essayées quand aucune n'est configurée.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/gnu-free/FreeMono.otf",
    "/System/Library/Fonts/Menlo.ttc",
    "/Library/Fonts/Courier New.ttf",
    "C:\\Windows\\Fonts\\cour.ttf",
    "C:\\Windows\\Fonts\\consola.ttf",
];

/// Puce 8×8 (absente de font8x8). Bit 0 = pixel de gauche.
const DOT_BITMAP: [u8; 8] = [0x00, 0x00, 0x18, 0x3C, 0x3C, 0x18, 0x00, 0x00];

/// Taille en points → pixels à 96 dpi.
#[inline]
fn pt_to_px(font_size: u32) -> f32 {
    font_size as f32 * 96.0 / 72.0
}

enum GlyphSource {
    /// Police vectorielle rasterisée via ab_glyph.
    Outline {
        font: FontVec,
        scale: PxScale,
        ascent: f32,
    },
    /// Bitmap 8×8 intégré, agrandi d'un facteur entier.
    Bitmap { factor: u32 },
}

/// Rasterise les glyphes d'une grille en masques de couverture.
///
/// Chaque masque fait `cell_width × cell_height` octets (0 = fond,
/// 255 = encre). Les métriques de cellule suivent la police : avance de `W`
/// en largeur, hauteur de ligne + [`LINE_GAP_PX`] en hauteur.
///
/// # Example
/// ```
/// use gc_export::glyphs::GlyphAtlas;
/// let atlas = GlyphAtlas::builtin(10);
/// assert_eq!(atlas.cell_size(), (16, 18));
/// assert_eq!(atlas.coverage('@').len(), 16 * 18);
/// ```
pub struct GlyphAtlas {
    source: GlyphSource,
    cell_width: u32,
    cell_height: u32,
}

impl GlyphAtlas {
    /// Charge la police `font_path`, sinon une police monospace système,
    /// sinon le bitmap intégré. Ne faillit jamais.
    #[must_use]
    pub fn load(font_path: Option<&Path>, font_size: u32) -> Self {
        if let Some(path) = font_path {
            match Self::from_font_file(path, font_size) {
                Ok(atlas) => return atlas,
                Err(e) => log::warn!("Police {} ignorée : {e}", path.display()),
            }
        }
        if let Some(path) = find_system_font() {
            match Self::from_font_file(&path, font_size) {
                Ok(atlas) => {
                    log::info!("Police système : {}", path.display());
                    return atlas;
                }
                Err(e) => log::debug!("Police {} ignorée : {e}", path.display()),
            }
        }
        log::info!("Aucune police trouvée, bitmap 8x8 intégré");
        Self::builtin(font_size)
    }

    /// Atlas bitmap intégré, indépendant du système.
    #[must_use]
    pub fn builtin(font_size: u32) -> Self {
        let factor = ((pt_to_px(font_size) / 8.0).round() as u32).max(1);
        Self {
            source: GlyphSource::Bitmap { factor },
            cell_width: 8 * factor,
            cell_height: 8 * factor + LINE_GAP_PX,
        }
    }

    /// Atlas depuis un fichier TTF/OTF.
    ///
    /// # Errors
    /// [`EncodeError::Io`] si le fichier est illisible,
    /// [`EncodeError::Font`] si ce n'est pas une police.
    pub fn from_font_file(path: &Path, font_size: u32) -> Result<Self, EncodeError> {
        let data = std::fs::read(path)?;
        Self::from_font_bytes(data, font_size)
    }

    /// Atlas depuis des octets de police.
    ///
    /// # Errors
    /// [`EncodeError::Font`] si les octets ne forment pas une police.
    pub fn from_font_bytes(data: Vec<u8>, font_size: u32) -> Result<Self, EncodeError> {
        let font = FontVec::try_from_vec(data).map_err(|e| EncodeError::Font(e.to_string()))?;
        let scale = PxScale::from(pt_to_px(font_size));
        let scaled = font.as_scaled(scale);

        let ascent = scaled.ascent();
        let line = (scaled.ascent() - scaled.descent()).ceil() as u32;
        let advance = scaled.h_advance(font.glyph_id('W')).ceil() as u32;

        Ok(Self {
            cell_width: advance.max(1),
            cell_height: line.max(1) + LINE_GAP_PX,
            source: GlyphSource::Outline {
                font,
                scale,
                ascent,
            },
        })
    }

    /// `(largeur, hauteur)` d'une cellule en pixels.
    #[must_use]
    pub fn cell_size(&self) -> (u32, u32) {
        (self.cell_width, self.cell_height)
    }

    /// Masque de couverture d'un glyphe. Glyphe inconnu = masque vide.
    #[must_use]
    pub fn coverage(&self, ch: char) -> Vec<u8> {
        let mut mask = vec![0u8; (self.cell_width * self.cell_height) as usize];
        if ch.is_whitespace() {
            return mask;
        }
        match &self.source {
            GlyphSource::Outline {
                font,
                scale,
                ascent,
            } => self.draw_outline(font, *scale, *ascent, ch, &mut mask),
            GlyphSource::Bitmap { factor } => self.draw_bitmap(*factor, ch, &mut mask),
        }
        mask
    }

    /// Masques de tous les glyphes distincts de `glyphs`.
    #[must_use]
    pub fn coverage_map(&self, glyphs: impl IntoIterator<Item = char>) -> HashMap<char, Vec<u8>> {
        let mut map = HashMap::new();
        for ch in glyphs {
            map.entry(ch).or_insert_with(|| self.coverage(ch));
        }
        map
    }

    fn draw_outline(&self, font: &FontVec, scale: PxScale, ascent: f32, ch: char, mask: &mut [u8]) {
        let gid = font.glyph_id(ch);
        if gid.0 == 0 {
            log::debug!("Glyphe {ch:?} absent de la police");
            return;
        }
        let glyph = gid.with_scale_and_position(scale, point(0.0, ascent));
        let Some(outline) = font.outline_glyph(glyph) else {
            return;
        };
        let bounds = outline.px_bounds();
        let (w, h) = (self.cell_width as i32, self.cell_height as i32);
        #[allow(clippy::cast_possible_wrap)]
        outline.draw(|x, y, v| {
            let px = x as i32 + bounds.min.x as i32;
            let py = y as i32 + bounds.min.y as i32;
            if (0..w).contains(&px) && (0..h).contains(&py) {
                let idx = (py * w + px) as usize;
                mask[idx] = mask[idx].max((v * 255.0).round() as u8);
            }
        });
    }

    fn draw_bitmap(&self, factor: u32, ch: char, mask: &mut [u8]) {
        let Some(rows) = bitmap_for(ch) else {
            log::debug!("Glyphe {ch:?} absent du bitmap intégré");
            return;
        };
        for (gy, bits) in rows.iter().enumerate() {
            for gx in 0..8u32 {
                if bits & (1 << gx) == 0 {
                    continue;
                }
                for dy in 0..factor {
                    let py = gy as u32 * factor + dy;
                    let row = (py * self.cell_width) as usize;
                    for dx in 0..factor {
                        mask[row + (gx * factor + dx) as usize] = 255;
                    }
                }
            }
        }
    }
}

fn bitmap_for(ch: char) -> Option<[u8; 8]> {
    if ch == DOT_GLYPH {
        return Some(DOT_BITMAP);
    }
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BLOCK_FONTS.get(ch))
        .or_else(|| BOX_FONTS.get(ch))
}

fn find_system_font() -> Option<PathBuf> {
    SYSTEM_FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_cell_follows_font_size() {
        assert_eq!(GlyphAtlas::builtin(6).cell_size(), (8, 10));
        assert_eq!(GlyphAtlas::builtin(10).cell_size(), (16, 18));
        assert_eq!(GlyphAtlas::builtin(20).cell_size(), (24, 26));
    }

    #[test]
    fn space_is_blank_and_block_is_full() {
        let atlas = GlyphAtlas::builtin(6);
        assert!(atlas.coverage(' ').iter().all(|&a| a == 0));
        let full = atlas.coverage('█');
        assert!(full[..64].iter().all(|&a| a == 255));
    }

    #[test]
    fn dot_glyph_has_ink() {
        let atlas = GlyphAtlas::builtin(6);
        let mask = atlas.coverage(DOT_GLYPH);
        assert_eq!(mask.iter().filter(|&&a| a == 255).count(), 12);
        // centre du bitmap, ligne 3 colonne 3
        assert_eq!(mask[3 * 8 + 3], 255);
    }

    #[test]
    fn unknown_glyph_is_blank() {
        let atlas = GlyphAtlas::builtin(6);
        assert!(atlas.coverage('漢').iter().all(|&a| a == 0));
    }

    #[test]
    fn invalid_font_bytes_rejected() {
        assert!(matches!(
            GlyphAtlas::from_font_bytes(vec![1, 2, 3], 10),
            Err(EncodeError::Font(_))
        ));
    }

    #[test]
    fn missing_font_falls_back() {
        let atlas = GlyphAtlas::load(Some(Path::new("/nonexistent/font.ttf")), 10);
        let (w, h) = atlas.cell_size();
        assert!(w > 0 && h > LINE_GAP_PX);
    }

    #[test]
    fn coverage_map_dedups() {
        let atlas = GlyphAtlas::builtin(6);
        let map = atlas.coverage_map("aab a".chars());
        assert_eq!(map.len(), 3);
    }
}
