use gc_core::config::RenderConfig;

/// Mode de normalisation actif pour un rendu.
///
/// # Example
/// ```
/// use gc_ascii::contrast::Normalization;
/// use gc_core::config::RenderConfig;
/// let mut config = RenderConfig::default();
/// config.auto_contrast = true;
/// assert_eq!(Normalization::from(&config), Normalization::Auto);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Normalization {
    /// Gain fixe autour de 128.
    Manual(f32),
    /// Étirement min-max recalculé à chaque frame.
    Auto,
}

impl From<&RenderConfig> for Normalization {
    fn from(config: &RenderConfig) -> Self {
        if config.auto_contrast {
            Self::Auto
        } else {
            Self::Manual(config.contrast)
        }
    }
}

/// `clamp(128 + (l - 128) * contrast, 0, 255)`.
///
/// # Example
/// ```
/// use gc_ascii::contrast::manual_contrast;
/// assert_eq!(manual_contrast(100.0, 1.0), 100.0);
/// assert_eq!(manual_contrast(250.0, 3.0), 255.0);
/// ```
#[inline(always)]
#[must_use]
pub fn manual_contrast(l: f32, contrast: f32) -> f32 {
    (128.0 + (l - 128.0) * contrast).clamp(0.0, 255.0)
}

/// Normalize a luminance plane in place. Output is always in [0, 255].
///
/// In auto mode a flat plane (`max == min`) passes through unchanged.
pub fn normalize(lum: &mut [f32], mode: Normalization) {
    match mode {
        Normalization::Manual(contrast) => {
            for l in lum.iter_mut() {
                *l = manual_contrast(*l, contrast);
            }
        }
        Normalization::Auto => {
            let (min, max) = min_max(lum);
            let range = max - min;
            if range > 0.0 {
                for l in lum.iter_mut() {
                    *l = ((*l - min) * 255.0 / range).clamp(0.0, 255.0);
                }
            } else {
                for l in lum.iter_mut() {
                    *l = l.clamp(0.0, 255.0);
                }
            }
        }
    }
}

fn min_max(lum: &[f32]) -> (f32, f32) {
    lum.iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &l| {
            (lo.min(l), hi.max(l))
        })
}
