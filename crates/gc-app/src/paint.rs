use std::io::Write;

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::queue;
use gc_core::frame::Grid;

/// Ligne d'état sous la grille.
#[derive(Clone, Debug, PartialEq)]
pub struct Status {
    pub fps: f64,
    pub grid: (u16, u16),
    pub source: (u32, u32),
    pub charset: String,
}

impl Status {
    #[must_use]
    pub fn line(&self) -> String {
        format!(
            "FPS: {:.1} | ASCII: {}x{} | Source: {}x{} | {}",
            self.fps, self.grid.0, self.grid.1, self.source.0, self.source.1, self.charset
        )
    }
}

#[inline]
fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb { r, g, b }
}

/// Peint la grille en truecolor à partir du coin haut-gauche.
///
/// Couleurs via [`Grid::color_at`], comme les exports. La couleur n'est
/// réémise que lorsqu'elle change.
///
/// # Errors
/// Propage les erreurs d'écriture terminal.
///
/// # Example
/// ```
/// use gc_app::paint::paint_grid;
/// use gc_core::frame::Grid;
/// let mut out = Vec::new();
/// paint_grid(&mut out, &Grid::from_glyph_rows(&["ab"]).unwrap(), None).unwrap();
/// assert!(String::from_utf8(out).unwrap().contains("ab"));
/// ```
pub fn paint_grid<W: Write>(out: &mut W, grid: &Grid, status: Option<&Status>) -> std::io::Result<()> {
    queue!(out, MoveTo(0, 0), SetBackgroundColor(rgb(grid.style.background())))?;

    for y in 0..grid.height {
        queue!(out, MoveTo(0, y))?;
        let mut current = None;
        for x in 0..grid.width {
            let color = grid.color_at(x, y);
            if current != Some(color) {
                queue!(out, SetForegroundColor(rgb(color)))?;
                current = Some(color);
            }
            queue!(out, Print(grid.get(x, y).glyph))?;
        }
    }

    queue!(out, ResetColor)?;
    if let Some(status) = status {
        queue!(
            out,
            MoveTo(0, grid.height),
            Clear(ClearType::CurrentLine),
            Print(status.line())
        )?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gc_core::color::ColorStyle;
    use gc_core::frame::Cell;

    #[test]
    fn emits_truecolor_and_glyphs() {
        let mut grid = Grid::new(2, 1);
        grid.style = ColorStyle {
            use_color: true,
            ..ColorStyle::default()
        };
        grid.set(0, 0, Cell {
            glyph: '@',
            luminance: 200.0,
            color: (10, 20, 30),
        });
        grid.set(1, 0, Cell {
            glyph: '#',
            luminance: 200.0,
            color: (10, 20, 30),
        });
        let mut out = Vec::new();
        paint_grid(&mut out, &grid, None).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("@#"));
        // même couleur : une seule séquence
        assert_eq!(text.matches("38;2;10;20;30").count(), 1);
    }

    #[test]
    fn status_line_format() {
        let status = Status {
            fps: 29.96,
            grid: (60, 34),
            source: (640, 480),
            charset: "detailed".into(),
        };
        assert_eq!(status.line(), "FPS: 30.0 | ASCII: 60x34 | Source: 640x480 | detailed");
        let mut out = Vec::new();
        paint_grid(&mut out, &Grid::from_glyph_rows(&["a"]).unwrap(), Some(&status)).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("FPS: 30.0"));
    }
}
