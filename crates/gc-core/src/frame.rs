use crate::color::{ColorStyle, cell_color};
use crate::error::CoreError;

/// Image source RGB, 3 bytes par pixel, row-major.
///
/// Appartient à la source ; le pipeline l'emprunte le temps d'un rendu.
///
/// # Example
/// ```
/// use gc_core::frame::Frame;
/// let frame = Frame::new(10, 10);
/// assert_eq!(frame.data.len(), 300);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Pixels RGB, row-major, 3 bytes par pixel.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Frame {
    /// Black frame of the given size.
    ///
    /// # Example
    /// ```
    /// use gc_core::frame::Frame;
    /// let frame = Frame::new(100, 50);
    /// assert_eq!(frame.width, 100);
    /// assert_eq!(frame.height, 50);
    /// ```
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize * 3],
            width,
            height,
        }
    }

    /// Wrap an existing RGB buffer.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidDimensions`] when the buffer length is not
    /// `width * height * 3`.
    ///
    /// # Example
    /// ```
    /// use gc_core::frame::Frame;
    /// assert!(Frame::from_rgb(2, 1, vec![0; 6]).is_ok());
    /// assert!(Frame::from_rgb(2, 1, vec![0; 5]).is_err());
    /// ```
    pub fn from_rgb(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CoreError> {
        if data.len() != width as usize * height as usize * 3 {
            return Err(CoreError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Frame filled with a single color.
    ///
    /// # Example
    /// ```
    /// use gc_core::frame::Frame;
    /// let frame = Frame::filled(4, 4, (10, 20, 30));
    /// assert_eq!(frame.pixel(3, 3), (10, 20, 30));
    /// ```
    #[must_use]
    pub fn filled(width: u32, height: u32, (r, g, b): (u8, u8, u8)) -> Self {
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * 3);
        for _ in 0..count {
            data.extend_from_slice(&[r, g, b]);
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// True if the frame has no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Accès au pixel (x, y) → (r, g, b).
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8) {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        match self.data.get(idx..idx + 3) {
            Some(px) => (px[0], px[1], px[2]),
            None => (0, 0, 0),
        }
    }
}

/// Une cellule de la grille : glyphe, luminance normalisée, couleur source.
///
/// # Example
/// ```
/// use gc_core::frame::Cell;
/// let cell = Cell::default();
/// assert_eq!(cell.glyph, ' ');
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    /// Caractère à afficher.
    pub glyph: char,
    /// Luminance normalisée [0, 255].
    pub luminance: f32,
    /// Couleur RGB rééchantillonnée, avant toute transformation.
    pub color: (u8, u8, u8),
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            glyph: ' ',
            luminance: 0.0,
            color: (0, 0, 0),
        }
    }
}

/// Grille de sortie, recalculée entièrement à chaque rendu.
///
/// # Example
/// ```
/// use gc_core::frame::{Cell, Grid};
/// let mut grid = Grid::new(80, 24);
/// grid.set(0, 0, Cell { glyph: '@', luminance: 255.0, color: (255, 0, 0) });
/// assert_eq!(grid.get(0, 0).glyph, '@');
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    /// Flat array of cells, row-major.
    pub cells: Vec<Cell>,
    /// Width in cells.
    pub width: u16,
    /// Height in cells.
    pub height: u16,
    /// Color settings the grid was rendered with.
    pub style: ColorStyle,
}

impl Grid {
    /// Crée une grille remplie d'espaces.
    ///
    /// # Example
    /// ```
    /// use gc_core::frame::Grid;
    /// let grid = Grid::new(80, 24);
    /// assert_eq!(grid.cells.len(), 80 * 24);
    /// ```
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            cells: vec![Cell::default(); width as usize * height as usize],
            width,
            height,
            style: ColorStyle::default(),
        }
    }

    /// Build a grid from rows of glyphs. Short rows are padded with spaces.
    ///
    /// # Errors
    /// [`CoreError::InvalidDimensions`] when a side exceeds `u16::MAX` cells.
    ///
    /// # Example
    /// ```
    /// use gc_core::frame::Grid;
    /// let grid = Grid::from_glyph_rows(&["ab", "cd"]).unwrap();
    /// assert_eq!(grid.to_text(), "ab\ncd");
    /// ```
    pub fn from_glyph_rows(rows: &[&str]) -> Result<Self, CoreError> {
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let invalid = || CoreError::InvalidDimensions {
            width: u32::try_from(width).unwrap_or(u32::MAX),
            height: u32::try_from(rows.len()).unwrap_or(u32::MAX),
        };
        let w = u16::try_from(width).map_err(|_| invalid())?;
        let h = u16::try_from(rows.len()).map_err(|_| invalid())?;
        let mut grid = Self::new(w, h);
        for (y, row) in rows.iter().enumerate() {
            for (x, glyph) in row.chars().enumerate() {
                grid.set(
                    x as u16,
                    y as u16,
                    Cell {
                        glyph,
                        ..Cell::default()
                    },
                );
            }
        }
        Ok(grid)
    }

    /// Set a cell at position (x, y).
    #[inline(always)]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        self.cells[y as usize * self.width as usize + x as usize] = cell;
    }

    /// Get a cell reference at position (x, y).
    #[inline(always)]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> &Cell {
        &self.cells[y as usize * self.width as usize + x as usize]
    }

    /// True when the grid holds no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over rows of cells, top to bottom.
    ///
    /// # Example
    /// ```
    /// use gc_core::frame::Grid;
    /// let grid = Grid::new(3, 2);
    /// assert_eq!(grid.rows().count(), 2);
    /// ```
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// Final paint color of the cell at (x, y).
    #[inline(always)]
    #[must_use]
    pub fn color_at(&self, x: u16, y: u16) -> (u8, u8, u8) {
        cell_color(self.get(x, y), &self.style)
    }

    /// Texte brut : glyphes de chaque ligne, lignes séparées par `\n`.
    ///
    /// La couleur est ignorée. Grille vide → chaîne vide.
    ///
    /// # Example
    /// ```
    /// use gc_core::frame::Grid;
    /// assert_eq!(Grid::new(0, 0).to_text(), "");
    /// ```
    #[must_use]
    pub fn to_text(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let mut out = String::with_capacity(self.cells.len() + self.height as usize);
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.extend(row.iter().map(|c| c.glyph));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_of_two_by_two() {
        let grid = Grid::from_glyph_rows(&["ab", "cd"]).unwrap();
        assert_eq!(grid.to_text(), "ab\ncd");
    }

    #[test]
    fn text_ignores_color() {
        let mut grid = Grid::from_glyph_rows(&["xy"]).unwrap();
        grid.cells[0].color = (255, 0, 0);
        grid.style.invert = true;
        assert_eq!(grid.to_text(), "xy");
    }

    #[test]
    fn oversized_rows_rejected() {
        let wide = "a".repeat(usize::from(u16::MAX) + 1);
        assert_eq!(
            Grid::from_glyph_rows(&[wide.as_str()]),
            Err(CoreError::InvalidDimensions {
                width: 65_536,
                height: 1
            })
        );
        let tall = vec![""; usize::from(u16::MAX) + 1];
        assert!(Grid::from_glyph_rows(&tall).is_err());

        let widest = "a".repeat(usize::from(u16::MAX));
        assert_eq!(Grid::from_glyph_rows(&[widest.as_str()]).unwrap().width, u16::MAX);
    }

    #[test]
    fn empty_grid_is_empty_text() {
        assert_eq!(Grid::new(5, 0).to_text(), "");
        assert_eq!(Grid::new(0, 5).to_text(), "");
    }

    #[test]
    fn frame_rejects_wrong_length() {
        assert_eq!(
            Frame::from_rgb(3, 3, vec![0; 26]),
            Err(CoreError::InvalidDimensions {
                width: 3,
                height: 3
            })
        );
    }

    #[test]
    fn filled_frame_pixels() {
        let frame = Frame::filled(2, 2, (1, 2, 3));
        assert_eq!(frame.data, vec![1, 2, 3, 1, 2, 3, 1, 2, 3, 1, 2, 3]);
    }
}
