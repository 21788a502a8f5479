use crate::config::RenderConfig;
use crate::frame::Cell;

/// Background for a normal render.
pub const BG_DARK: (u8, u8, u8) = (0, 0, 0);
/// Background when the global invert is on.
pub const BG_LIGHT: (u8, u8, u8) = (255, 255, 255);

/// Sous-ensemble de la config qui décide de la couleur finale d'une cellule.
///
/// Copié dans chaque [`Grid`](crate::frame::Grid) au moment du rendu, pour que
/// tous les encodeurs voient exactement les mêmes réglages.
///
/// # Example
/// ```
/// use gc_core::color::ColorStyle;
/// use gc_core::config::RenderConfig;
/// let style = ColorStyle::from(&RenderConfig::default());
/// assert!(style.use_color);
/// assert!(!style.dot_mode);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ColorStyle {
    /// Keep the source color instead of a gray level.
    pub use_color: bool,
    /// Global invert (also steers the Dot-mode blend).
    pub invert: bool,
    /// Active character set is the Dot set.
    pub dot_mode: bool,
}

impl From<&RenderConfig> for ColorStyle {
    fn from(config: &RenderConfig) -> Self {
        Self {
            use_color: config.use_color,
            invert: config.invert,
            dot_mode: config.character_set.is_dot(),
        }
    }
}

impl ColorStyle {
    /// Canvas/page background color for this style.
    #[must_use]
    pub fn background(&self) -> (u8, u8, u8) {
        if self.invert { BG_LIGHT } else { BG_DARK }
    }
}

/// Final paint color of a cell, shared by every output path.
///
/// Order: color-select → dot-blend (Dot mode only) → global invert.
///
/// # Example
/// ```
/// use gc_core::color::{cell_color, ColorStyle};
/// use gc_core::frame::Cell;
/// let cell = Cell { glyph: '•', luminance: 128.0, color: (200, 200, 200) };
/// let style = ColorStyle { use_color: true, invert: false, dot_mode: true };
/// assert_eq!(cell_color(&cell, &style), (100, 100, 100));
/// ```
#[inline(always)]
#[must_use]
pub fn cell_color(cell: &Cell, style: &ColorStyle) -> (u8, u8, u8) {
    let lum = cell.luminance.clamp(0.0, 255.0);

    let base = if style.use_color {
        cell.color
    } else {
        let gray = lum as u8;
        (gray, gray, gray)
    };

    let blended = if style.dot_mode {
        dot_blend(base, lum, style.invert)
    } else {
        base
    };

    if style.invert {
        invert_rgb(blended)
    } else {
        blended
    }
}

/// Dot-mode brightness modulation.
///
/// Not inverted: scale toward black. Inverted: blend toward white as
/// luminance rises.
#[inline(always)]
#[must_use]
pub fn dot_blend((r, g, b): (u8, u8, u8), lum: f32, invert: bool) -> (u8, u8, u8) {
    let t = lum.clamp(0.0, 255.0) / 255.0;
    let channel = |c: u8| -> u8 {
        let c = f32::from(c);
        let v = if invert {
            c * (1.0 - t) + 255.0 * t
        } else {
            c * t
        };
        v.round().clamp(0.0, 255.0) as u8
    };
    (channel(r), channel(g), channel(b))
}

/// `255 - channel` on each component.
#[inline(always)]
#[must_use]
pub fn invert_rgb((r, g, b): (u8, u8, u8)) -> (u8, u8, u8) {
    (255 - r, 255 - g, 255 - b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(lum: f32, color: (u8, u8, u8)) -> Cell {
        Cell {
            glyph: '#',
            luminance: lum,
            color,
        }
    }

    #[test]
    fn grayscale_uses_truncated_luminance() {
        let style = ColorStyle {
            use_color: false,
            invert: false,
            dot_mode: false,
        };
        assert_eq!(cell_color(&cell(77.9, (1, 2, 3)), &style), (77, 77, 77));
    }

    #[test]
    fn dot_blend_darkens_toward_black() {
        assert_eq!(dot_blend((200, 200, 200), 128.0, false), (100, 100, 100));
        assert_eq!(dot_blend((200, 10, 90), 0.0, false), (0, 0, 0));
        assert_eq!(dot_blend((200, 10, 90), 255.0, false), (200, 10, 90));
    }

    #[test]
    fn dot_blend_inverted_moves_toward_white() {
        assert_eq!(dot_blend((0, 0, 0), 255.0, true), (255, 255, 255));
        assert_eq!(dot_blend((40, 80, 120), 0.0, true), (40, 80, 120));
    }

    #[test]
    fn global_invert_round_trips() {
        let c = cell(42.0, (12, 200, 99));
        let plain = ColorStyle {
            use_color: true,
            invert: false,
            dot_mode: false,
        };
        let inverted = ColorStyle {
            invert: true,
            ..plain
        };
        let once = cell_color(&c, &inverted);
        assert_eq!(once, (243, 55, 156));
        assert_eq!(invert_rgb(once), cell_color(&c, &plain));
    }

    #[test]
    fn dot_mode_is_inverted_after_blend() {
        // blend toward white with t = 1, then the global invert flips it to black
        let c = cell(255.0, (30, 60, 90));
        let style = ColorStyle {
            use_color: true,
            invert: true,
            dot_mode: true,
        };
        assert_eq!(cell_color(&c, &style), (0, 0, 0));
    }

    #[test]
    fn background_follows_invert() {
        let mut style = ColorStyle::default();
        assert_eq!(style.background(), BG_DARK);
        style.invert = true;
        assert_eq!(style.background(), BG_LIGHT);
    }
}
