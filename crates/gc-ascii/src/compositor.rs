use gc_core::charset::CharacterSet;
use gc_core::color::ColorStyle;
use gc_core::config::RenderConfig;
use gc_core::error::CoreError;
use gc_core::frame::{Cell, Frame, Grid};
use gc_source::resize::Resizer;
use rayon::prelude::*;

use crate::contrast::{Normalization, normalize};
use crate::luminance::extract_luminance;
use crate::quantize::SymbolQuantizer;

/// Pipeline complet frame → grille : resample, luminance, contraste,
/// quantification.
///
/// Garde le resizer, le plan de luminance et le quantizer entre deux rendus ;
/// la grille produite ne dépend que de `(frame, config)`.
///
/// # Example
/// ```
/// use gc_ascii::compositor::Renderer;
/// use gc_core::config::RenderConfig;
/// use gc_core::frame::Frame;
///
/// let mut renderer = Renderer::new();
/// let grid = renderer.render(&Frame::new(64, 48), &RenderConfig::default()).unwrap();
/// assert_eq!((grid.width, grid.height), (60, 34));
/// ```
pub struct Renderer {
    resizer: Resizer,
    luminance: Vec<f32>,
    quantizer: Option<(CharacterSet, SymbolQuantizer)>,
}

impl Renderer {
    /// Create a renderer with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            resizer: Resizer::new(),
            luminance: Vec::new(),
            quantizer: None,
        }
    }

    /// Render `frame` into a fresh grid of `grid_width × grid_height` cells.
    ///
    /// `config` is only read.
    ///
    /// # Errors
    /// [`CoreError::InvalidDimensions`] for a zero-sized grid or an empty or
    /// corrupt frame, [`CoreError::EmptyCharacterSet`] for an empty custom set.
    pub fn render(&mut self, frame: &Frame, config: &RenderConfig) -> Result<Grid, CoreError> {
        config.validate()?;
        let (width, height) = grid_dims(config)?;

        let resampled = self
            .resizer
            .resize(frame, u32::from(width), u32::from(height))?;

        extract_luminance(&resampled.data, &mut self.luminance);
        normalize(&mut self.luminance, Normalization::from(config));

        self.refresh_quantizer(&config.character_set)?;
        let Self {
            luminance,
            quantizer,
            ..
        } = self;
        let luminance: &[f32] = luminance;
        let quantizer = &quantizer.as_ref().ok_or(CoreError::EmptyCharacterSet)?.1;
        let row_len = usize::from(width);

        let mut grid = Grid::new(width, height);
        grid.style = ColorStyle::from(config);
        grid.cells
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(cy, row)| {
                let base = cy * row_len;
                for (cx, cell) in row.iter_mut().enumerate() {
                    let i = base + cx;
                    let l = luminance[i].clamp(0.0, 255.0);
                    let px = &resampled.data[i * 3..i * 3 + 3];
                    *cell = Cell {
                        glyph: quantizer.map(l),
                        luminance: l,
                        color: (px[0], px[1], px[2]),
                    };
                }
            });

        Ok(grid)
    }

    /// Rebuild the cached quantizer when the character set changed.
    fn refresh_quantizer(&mut self, set: &CharacterSet) -> Result<(), CoreError> {
        let stale = self.quantizer.as_ref().is_none_or(|(cached, _)| cached != set);
        if stale {
            log::debug!("Quantizer: jeu de caractères {}", set.name());
            self.quantizer = Some((set.clone(), SymbolQuantizer::new(set)?));
        }
        Ok(())
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn grid_dims(config: &RenderConfig) -> Result<(u16, u16), CoreError> {
    let invalid = || CoreError::InvalidDimensions {
        width: config.grid_width,
        height: config.grid_height,
    };
    let w = u16::try_from(config.grid_width).map_err(|_| invalid())?;
    let h = u16::try_from(config.grid_height).map_err(|_| invalid())?;
    Ok((w, h))
}

/// One-shot render. Prefer a long-lived [`Renderer`] in a loop.
///
/// # Errors
/// See [`Renderer::render`].
///
/// # Example
/// ```
/// use gc_ascii::compositor::render;
/// use gc_core::config::RenderConfig;
/// use gc_core::frame::Frame;
/// let grid = render(&Frame::filled(8, 8, (255, 255, 255)), &RenderConfig::default()).unwrap();
/// assert_eq!(grid.to_text().lines().count(), 34);
/// ```
pub fn render(frame: &Frame, config: &RenderConfig) -> Result<Grid, CoreError> {
    Renderer::new().render(frame, config)
}
