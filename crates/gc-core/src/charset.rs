use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// 70 caractères — Paul Bourke, du plus sombre au plus dense.
pub const CHARSET_DETAILED: &str =
    " .'`^\",:;Il!i><~+_-?][}{1)(|\\/tfjrxnuvczXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$";

/// 9 caractères — rendu « journal », dense → clair.
pub const CHARSET_NEWSPAPER: &str = "@#%+=-:. ";

/// Blocs Unicode — pseudo-pixels (peut s'afficher en carrés sur certains appareils).
pub const CHARSET_BLOCK: &str = "█▒░ ";

/// Glyphe unique du mode Dot. La luminance passe dans la couleur.
pub const DOT_GLYPH: char = '•';

const DOT_GLYPH_STR: &str = "•";

/// Active character-set policy.
///
/// Named presets are immutable constants. `Custom` carries a user-supplied
/// sequence from the configuration file and is validated before use.
///
/// # Example
/// ```
/// use gc_core::charset::CharacterSet;
/// let set = CharacterSet::Newspaper;
/// assert_eq!(set.glyph_count(), 9);
/// assert!(!set.is_dot());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum CharacterSet {
    /// Paul Bourke 70-glyph ramp.
    #[default]
    Detailed,
    /// Short ramp with a newspaper look.
    Newspaper,
    /// Unicode shade blocks.
    Block,
    /// Single fixed glyph, brightness-modulated color.
    Dot,
    /// User-defined ramp.
    Custom(String),
}

impl CharacterSet {
    /// Built-in presets, in UI order.
    pub const PRESETS: [CharacterSet; 4] = [
        CharacterSet::Detailed,
        CharacterSet::Newspaper,
        CharacterSet::Block,
        CharacterSet::Dot,
    ];

    /// Glyphs of this set, ordered as written.
    ///
    /// For `Dot` this is the single dot glyph.
    #[must_use]
    pub fn glyphs(&self) -> &str {
        match self {
            Self::Detailed => CHARSET_DETAILED,
            Self::Newspaper => CHARSET_NEWSPAPER,
            Self::Block => CHARSET_BLOCK,
            Self::Dot => DOT_GLYPH_STR,
            Self::Custom(s) => s,
        }
    }

    /// Number of glyphs (N in the quantizer formula).
    #[must_use]
    pub fn glyph_count(&self) -> usize {
        self.glyphs().chars().count()
    }

    /// True for the brightness-modulated single-glyph mode.
    #[inline(always)]
    #[must_use]
    pub fn is_dot(&self) -> bool {
        matches!(self, Self::Dot)
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Detailed => "Detailed",
            Self::Newspaper => "Newspaper",
            Self::Block => "Block",
            Self::Dot => "Dot",
            Self::Custom(_) => "Custom",
        }
    }

    /// Reject sets that cannot be quantized against.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyCharacterSet`] for a zero-length custom set.
    ///
    /// # Example
    /// ```
    /// use gc_core::charset::CharacterSet;
    /// assert!(CharacterSet::Custom(String::new()).validate().is_err());
    /// assert!(CharacterSet::Block.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.glyph_count() == 0 {
            return Err(CoreError::EmptyCharacterSet);
        }
        Ok(())
    }

    /// Parse a set from its name, case-insensitive.
    ///
    /// `custom:<glyphs>` (prefix in any case) builds a custom set from
    /// everything after the colon.
    ///
    /// # Errors
    /// Returns [`CoreError::UnknownCharacterSet`] for an unknown name and
    /// [`CoreError::EmptyCharacterSet`] for `custom:` with no glyphs.
    ///
    /// # Example
    /// ```
    /// use gc_core::charset::CharacterSet;
    /// assert_eq!(CharacterSet::from_name("block").unwrap(), CharacterSet::Block);
    /// assert_eq!(
    ///     CharacterSet::from_name("custom: .#").unwrap(),
    ///     CharacterSet::Custom(" .#".into())
    /// );
    /// ```
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        const CUSTOM: &str = "custom:";
        let prefixed = name
            .get(..CUSTOM.len())
            .is_some_and(|p| p.eq_ignore_ascii_case(CUSTOM));
        if prefixed {
            let set = Self::Custom(name[CUSTOM.len()..].to_string());
            set.validate()?;
            return Ok(set);
        }
        match name.trim().to_ascii_lowercase().as_str() {
            "detailed" => Ok(Self::Detailed),
            "newspaper" => Ok(Self::Newspaper),
            "block" => Ok(Self::Block),
            "dot" => Ok(Self::Dot),
            _ => Err(CoreError::UnknownCharacterSet(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_lengths() {
        assert_eq!(CharacterSet::Detailed.glyph_count(), 70);
        assert_eq!(CharacterSet::Newspaper.glyph_count(), 9);
        assert_eq!(CharacterSet::Block.glyph_count(), 4);
        assert_eq!(CharacterSet::Dot.glyph_count(), 1);
    }

    #[test]
    fn dot_glyph_is_the_only_glyph() {
        let first = CharacterSet::Dot.glyphs().chars().next();
        assert_eq!(first, Some(DOT_GLYPH));
    }

    #[test]
    fn presets_are_valid() {
        for set in &CharacterSet::PRESETS {
            assert!(set.validate().is_ok(), "{} invalide", set.name());
        }
    }

    #[test]
    fn empty_custom_rejected() {
        assert_eq!(
            CharacterSet::from_name("custom:"),
            Err(CoreError::EmptyCharacterSet)
        );
    }

    #[test]
    fn unknown_name_rejected() {
        assert!(matches!(
            CharacterSet::from_name("braille"),
            Err(CoreError::UnknownCharacterSet(_))
        ));
    }

    #[test]
    fn custom_prefix_in_any_case() {
        for name in ["custom:xyz", "Custom:xyz", "CUSTOM:xyz"] {
            assert_eq!(
                CharacterSet::from_name(name).unwrap(),
                CharacterSet::Custom("xyz".into())
            );
        }
        assert_eq!(
            CharacterSet::from_name("Custom:"),
            Err(CoreError::EmptyCharacterSet)
        );
        // glyphes multi-octets juste après le préfixe
        assert_eq!(
            CharacterSet::from_name("custom:█▒").unwrap(),
            CharacterSet::Custom("█▒".into())
        );
    }
}
