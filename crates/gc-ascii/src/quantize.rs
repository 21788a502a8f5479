use gc_core::charset::{CharacterSet, DOT_GLYPH};
use gc_core::error::CoreError;

/// Quantifie une luminance normalisée en glyphe.
///
/// Les glyphes sont collectés une seule fois ; `map` est sans allocation.
///
/// # Example
/// ```
/// use gc_ascii::quantize::SymbolQuantizer;
/// use gc_core::charset::CharacterSet;
/// let q = SymbolQuantizer::new(&CharacterSet::Custom("ab".into())).unwrap();
/// assert_eq!(q.map(0.0), 'a');
/// assert_eq!(q.map(255.0), 'b');
/// ```
#[derive(Clone, Debug)]
pub struct SymbolQuantizer {
    glyphs: Vec<char>,
    dot: bool,
}

impl SymbolQuantizer {
    /// Build a quantizer for `set`.
    ///
    /// # Errors
    /// [`CoreError::EmptyCharacterSet`] when the set has no glyph.
    pub fn new(set: &CharacterSet) -> Result<Self, CoreError> {
        set.validate()?;
        Ok(Self {
            glyphs: set.glyphs().chars().collect(),
            dot: set.is_dot(),
        })
    }

    /// Number of glyphs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Jamais vrai pour un quantizer construit.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// `floor(clamp(l / 255 * (N - 1), 0, N - 1))`.
    ///
    /// # Example
    /// ```
    /// use gc_ascii::quantize::SymbolQuantizer;
    /// use gc_core::charset::CharacterSet;
    /// let q = SymbolQuantizer::new(&CharacterSet::Newspaper).unwrap();
    /// assert_eq!(q.index(255.0), 8);
    /// assert_eq!(q.index(-4.0), 0);
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn index(&self, l: f32) -> usize {
        let max = self.glyphs.len().saturating_sub(1);
        let scaled = (l / 255.0 * max as f32).clamp(0.0, max as f32);
        // NaN tombe sur 0
        (scaled.floor() as usize).min(max)
    }

    /// Glyph for a normalized luminance. Dot mode always yields the dot.
    #[inline(always)]
    #[must_use]
    pub fn map(&self, l: f32) -> char {
        if self.dot {
            return DOT_GLYPH;
        }
        self.glyphs[self.index(l)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_in_bounds_and_monotonic() {
        for set in CharacterSet::PRESETS {
            let q = SymbolQuantizer::new(&set).unwrap();
            let mut prev = 0;
            for step in 0..=2550 {
                let l = step as f32 / 10.0;
                let idx = q.index(l);
                assert!(idx < q.len());
                assert!(idx >= prev, "{} non monotone à {l}", set.name());
                prev = idx;
            }
            assert_eq!(q.index(255.0), q.len() - 1);
        }
    }

    #[test]
    fn out_of_range_luminance_is_clamped() {
        let q = SymbolQuantizer::new(&CharacterSet::Detailed).unwrap();
        assert_eq!(q.index(-100.0), 0);
        assert_eq!(q.index(1e9), q.len() - 1);
        assert_eq!(q.index(f32::NAN), 0);
    }

    #[test]
    fn single_glyph_set() {
        let q = SymbolQuantizer::new(&CharacterSet::Custom("#".into())).unwrap();
        assert_eq!(q.map(0.0), '#');
        assert_eq!(q.map(255.0), '#');
    }

    #[test]
    fn dot_is_constant() {
        let q = SymbolQuantizer::new(&CharacterSet::Dot).unwrap();
        for l in [0.0, 64.0, 128.0, 255.0] {
            assert_eq!(q.map(l), DOT_GLYPH);
        }
    }

    #[test]
    fn empty_set_rejected() {
        assert_eq!(
            SymbolQuantizer::new(&CharacterSet::Custom(String::new())).unwrap_err(),
            CoreError::EmptyCharacterSet
        );
    }

    #[test]
    fn block_set_order() {
        let q = SymbolQuantizer::new(&CharacterSet::Block).unwrap();
        assert_eq!(q.map(0.0), '█');
        assert_eq!(q.map(255.0), ' ');
    }
}
