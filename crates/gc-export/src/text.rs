use std::io::Write;

use gc_core::frame::Grid;

/// Texte brut de la grille, lignes séparées par `\n`, sans saut final.
///
/// # Example
/// ```
/// use gc_export::text::to_text;
/// use gc_core::frame::Grid;
/// assert_eq!(to_text(&Grid::from_glyph_rows(&["ab", "cd"]).unwrap()), "ab\ncd");
/// ```
#[must_use]
pub fn to_text(grid: &Grid) -> String {
    grid.to_text()
}

/// Écrit le texte de la grille suivi d'un saut de ligne (sortie terminal).
///
/// # Errors
/// Propage l'erreur d'écriture.
pub fn write_text<W: Write>(out: &mut W, grid: &Grid) -> std::io::Result<()> {
    let text = grid.to_text();
    out.write_all(text.as_bytes())?;
    if !text.is_empty() {
        out.write_all(b"\n")?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_grid_is_empty_text() {
        assert_eq!(to_text(&Grid::new(0, 0)), "");
        let mut out = Vec::new();
        write_text(&mut out, &Grid::new(0, 0)).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn unicode_glyphs_survive() {
        let grid = Grid::from_glyph_rows(&["█▒", "░•"]).unwrap();
        let mut out = Vec::new();
        write_text(&mut out, &grid).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "█▒\n░•\n");
    }
}
