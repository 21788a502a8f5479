use gc_core::frame::Grid;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Color;
use ratatui::widgets::Paragraph;

use crate::paint::Status;

#[inline]
fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(r, g, b)
}

/// Écrit une [`Grid`] directement dans un `ratatui::Buffer`.
///
/// Pas de widget : une cellule de grille = une cellule terminal, couleur
/// finale via [`Grid::color_at`]. Ce qui dépasse `area` est coupé.
///
/// # Example
/// ```
/// use gc_app::canvas::render_grid;
/// use gc_core::frame::Grid;
/// use ratatui::buffer::Buffer;
/// use ratatui::layout::Rect;
///
/// let area = Rect::new(0, 0, 4, 2);
/// let mut buf = Buffer::empty(area);
/// render_grid(&mut buf, area, &Grid::from_glyph_rows(&["ab"]).unwrap());
/// assert_eq!(buf[(1, 0)].symbol(), "b");
/// ```
pub fn render_grid(buf: &mut Buffer, area: Rect, grid: &Grid) {
    let bg = rgb(grid.style.background());
    for cy in 0..grid.height.min(area.height) {
        for cx in 0..grid.width.min(area.width) {
            if let Some(cell) = buf.cell_mut((area.x + cx, area.y + cy)) {
                cell.set_char(grid.get(cx, cy).glyph)
                    .set_fg(rgb(grid.color_at(cx, cy)))
                    .set_bg(bg);
            }
        }
    }
}

/// Vue live : la grille en haut, la ligne d'état sur la dernière ligne.
pub fn draw(frame: &mut Frame, grid: &Grid, status: &Status) {
    let [view, bar] = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());
    render_grid(frame.buffer_mut(), view, grid);
    frame.render_widget(Paragraph::new(status.line()), bar);
}

#[cfg(test)]
mod tests {
    use super::*;
    use gc_core::color::ColorStyle;
    use gc_core::frame::Cell;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn cells_carry_final_colors() {
        let mut grid = Grid::new(2, 1);
        grid.style = ColorStyle {
            use_color: true,
            invert: true,
            dot_mode: false,
        };
        grid.set(0, 0, Cell {
            glyph: '@',
            luminance: 100.0,
            color: (10, 20, 30),
        });
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        render_grid(&mut buf, area, &grid);

        assert_eq!(buf[(0, 0)].symbol(), "@");
        assert_eq!(buf[(0, 0)].fg, Color::Rgb(245, 235, 225));
        assert_eq!(buf[(0, 0)].bg, Color::Rgb(255, 255, 255));
        // hors grille : intact
        assert_eq!(buf[(2, 0)].bg, Color::Reset);
        assert_eq!(buf[(0, 1)].bg, Color::Reset);
    }

    #[test]
    fn grid_clipped_to_area() {
        let grid = Grid::from_glyph_rows(&["abcde", "fghij", "klmno"]).unwrap();
        let mut buf = Buffer::empty(Rect::new(0, 0, 4, 3));
        render_grid(&mut buf, Rect::new(1, 1, 3, 2), &grid);
        assert_eq!(buf[(1, 1)].symbol(), "a");
        assert_eq!(buf[(3, 2)].symbol(), "h");
        assert_eq!(buf[(0, 0)].symbol(), " ");
    }

    #[test]
    fn status_on_last_line() {
        let mut terminal = Terminal::new(TestBackend::new(12, 3)).unwrap();
        let grid = Grid::from_glyph_rows(&["xy"]).unwrap();
        let status = Status {
            fps: 30.0,
            grid: (2, 1),
            source: (640, 480),
            charset: "detailed".into(),
        };
        terminal.draw(|f| draw(f, &grid, &status)).unwrap();

        let buf = terminal.backend().buffer();
        assert_eq!(buf[(0, 0)].symbol(), "x");
        let last: String = (0..12).map(|x| buf[(x, 2)].symbol()).collect();
        assert!(last.starts_with("FPS: 30.0"));
    }
}
