use gc_core::config::PageFormat;
use gc_core::frame::Grid;

use crate::error::EncodeError;

/// Points PDF par millimètre.
pub const PT_PER_MM: f32 = 72.0 / 25.4;

/// Avance Courier en fraction de corps (600/1000 em).
const COURIER_ADVANCE: f32 = 0.6;

/// Descente approximative de Courier, fraction du corps.
const COURIER_DESCENT: f32 = 0.2;

/// Taille physique d'une page, en millimètres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageSize {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl From<PageFormat> for PageSize {
    fn from(format: PageFormat) -> Self {
        let (width_mm, height_mm) = format.dimensions_mm();
        Self {
            width_mm,
            height_mm,
        }
    }
}

impl PageSize {
    /// Dimensions en points.
    #[must_use]
    pub fn points(self) -> (f32, f32) {
        (self.width_mm * PT_PER_MM, self.height_mm * PT_PER_MM)
    }
}

/// Pas constant entre glyphes, en millimètres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphPitch {
    pub x_mm: f32,
    pub y_mm: f32,
}

impl Default for GlyphPitch {
    fn default() -> Self {
        Self {
            x_mm: 1.6,
            y_mm: 2.8,
        }
    }
}

/// Placement de la grille sur la page, en points (origine PDF en bas à gauche).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    /// Bord gauche de la boîte englobante.
    pub left: f32,
    /// Bord haut de la boîte englobante.
    pub top: f32,
    pub pitch_x: f32,
    pub pitch_y: f32,
    /// Corps de police tel que l'avance Courier = `pitch_x`.
    pub font_size: f32,
}

impl Layout {
    /// Centre la boîte `grid_w × pitch_x` par `grid_h × pitch_y` sur la page.
    ///
    /// # Example
    /// ```
    /// use gc_export::vector::{GlyphPitch, Layout, PageSize};
    /// let page = PageSize { width_mm: 100.0, height_mm: 100.0 };
    /// let pitch = GlyphPitch { x_mm: 10.0, y_mm: 10.0 };
    /// let layout = Layout::centered(2, 2, page, pitch);
    /// let mm = |pt: f32| pt * 25.4 / 72.0;
    /// assert!((mm(layout.left) - 40.0).abs() < 1e-3);
    /// assert!((mm(layout.top) - 60.0).abs() < 1e-3);
    /// ```
    #[must_use]
    pub fn centered(grid_w: u16, grid_h: u16, page: PageSize, pitch: GlyphPitch) -> Self {
        let (page_w, page_h) = page.points();
        let pitch_x = pitch.x_mm * PT_PER_MM;
        let pitch_y = pitch.y_mm * PT_PER_MM;
        let box_w = f32::from(grid_w) * pitch_x;
        let box_h = f32::from(grid_h) * pitch_y;
        if box_w > page_w || box_h > page_h {
            log::warn!(
                "Grille {grid_w}x{grid_h} plus grande que la page ({box_w:.0}x{box_h:.0} pt > {page_w:.0}x{page_h:.0} pt)"
            );
        }
        Self {
            left: (page_w - box_w) / 2.0,
            top: (page_h + box_h) / 2.0,
            pitch_x,
            pitch_y,
            font_size: pitch_x / COURIER_ADVANCE,
        }
    }

    /// Origine (ligne de base) de la cellule `(x, y)`.
    #[must_use]
    pub fn origin(&self, x: u16, y: u16) -> (f32, f32) {
        let px = self.left + f32::from(x) * self.pitch_x;
        let py = self.top - (f32::from(y) + 1.0) * self.pitch_y + self.font_size * COURIER_DESCENT;
        (px, py)
    }
}

/// Octet WinAnsi (CP1252) d'un caractère, s'il existe.
///
/// # Example
/// ```
/// use gc_export::vector::win_ansi_byte;
/// assert_eq!(win_ansi_byte('@'), Some(b'@'));
/// assert_eq!(win_ansi_byte('•'), Some(0x95));
/// assert_eq!(win_ansi_byte('█'), None);
/// ```
#[must_use]
pub fn win_ansi_byte(ch: char) -> Option<u8> {
    let code = u32::from(ch);
    if (0x20..=0x7E).contains(&code) || (0xA0..=0xFF).contains(&code) {
        return Some(code as u8);
    }
    let byte = match ch {
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

/// Densité d'encre des blocs d'ombrage, dessinés en rectangles pleins.
#[must_use]
pub fn shade_fraction(ch: char) -> Option<f32> {
    match ch {
        '█' => Some(1.0),
        '▓' => Some(0.75),
        '▒' => Some(0.5),
        '░' => Some(0.25),
        _ => None,
    }
}

/// Ce qu'une cellule devient dans le document.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Mark {
    Skip,
    Text(u8),
    Shade(f32),
}

fn classify(ch: char) -> Result<Mark, EncodeError> {
    if ch.is_whitespace() {
        return Ok(Mark::Skip);
    }
    if let Some(fraction) = shade_fraction(ch) {
        return Ok(Mark::Shade(fraction));
    }
    win_ansi_byte(ch)
        .map(Mark::Text)
        .ok_or(EncodeError::UnsupportedGlyph(ch))
}

/// Met en page la grille sur une page PDF unique en Courier.
///
/// Les glyphes blancs sont sautés, les blocs d'ombrage deviennent des
/// rectangles, le fond de page suit le style de la grille.
///
/// # Errors
/// [`EncodeError::UnsupportedGlyph`] pour un glyphe hors WinAnsi,
/// [`EncodeError::BackendUnavailable`] sans la feature `pdf`,
/// [`EncodeError::Pdf`] si la sérialisation échoue.
///
/// # Example
/// ```
/// use gc_export::vector::{to_vector_document, GlyphPitch, PageSize};
/// use gc_core::config::PageFormat;
/// use gc_core::frame::Grid;
///
/// let grid = Grid::from_glyph_rows(&["ab", "cd"]).unwrap();
/// let pdf = to_vector_document(&grid, PageSize::from(PageFormat::A4), GlyphPitch::default());
/// # #[cfg(feature = "pdf")]
/// assert!(pdf.unwrap().starts_with(b"%PDF"));
/// ```
pub fn to_vector_document(
    grid: &Grid,
    page: PageSize,
    pitch: GlyphPitch,
) -> Result<Vec<u8>, EncodeError> {
    // Validation avant tout : aucun document partiel sur glyphe invalide.
    let marks = grid
        .cells
        .iter()
        .map(|c| classify(c.glyph))
        .collect::<Result<Vec<_>, _>>()?;
    let layout = Layout::centered(grid.width, grid.height, page, pitch);

    backend::write(grid, &marks, page, &layout)
}

#[cfg(feature = "pdf")]
mod backend {
    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object, Stream, StringFormat, dictionary};

    use super::{Layout, Mark, PageSize};
    use crate::error::EncodeError;
    use gc_core::frame::Grid;

    fn rgb(op: &str, (r, g, b): (u8, u8, u8)) -> Operation {
        Operation::new(
            op,
            vec![
                (f32::from(r) / 255.0).into(),
                (f32::from(g) / 255.0).into(),
                (f32::from(b) / 255.0).into(),
            ],
        )
    }

    fn shade((fr, fg, fb): (u8, u8, u8), (br, bg, bb): (u8, u8, u8), t: f32) -> (u8, u8, u8) {
        let mix = |f: u8, b: u8| (f32::from(b) + (f32::from(f) - f32::from(b)) * t).round() as u8;
        (mix(fr, br), mix(fg, bg), mix(fb, bb))
    }

    pub(super) fn write(
        grid: &Grid,
        marks: &[Mark],
        page: PageSize,
        layout: &Layout,
    ) -> Result<Vec<u8>, EncodeError> {
        let (page_w, page_h) = page.points();
        let background = grid.style.background();
        let width = usize::from(grid.width);

        let mut ops = vec![
            rgb("rg", background),
            Operation::new("re", vec![0.into(), 0.into(), page_w.into(), page_h.into()]),
            Operation::new("f", vec![]),
        ];

        // Blocs d'ombrage : rectangles hors du bloc texte.
        for (i, mark) in marks.iter().enumerate() {
            if let Mark::Shade(t) = *mark {
                let (x, y) = ((i % width) as u16, (i / width) as u16);
                let color = shade(grid.color_at(x, y), background, t);
                let left = layout.left + f32::from(x) * layout.pitch_x;
                let bottom = layout.top - (f32::from(y) + 1.0) * layout.pitch_y;
                ops.push(rgb("rg", color));
                ops.push(Operation::new(
                    "re",
                    vec![left.into(), bottom.into(), layout.pitch_x.into(), layout.pitch_y.into()],
                ));
                ops.push(Operation::new("f", vec![]));
            }
        }

        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("Tf", vec!["F1".into(), layout.font_size.into()]));
        let mut current = None;
        for (i, mark) in marks.iter().enumerate() {
            let Mark::Text(byte) = *mark else { continue };
            let (x, y) = ((i % width) as u16, (i / width) as u16);
            let color = grid.color_at(x, y);
            if current != Some(color) {
                ops.push(rgb("rg", color));
                current = Some(color);
            }
            let (ox, oy) = layout.origin(x, y);
            ops.push(Operation::new(
                "Tm",
                vec![1.into(), 0.into(), 0.into(), 1.into(), ox.into(), oy.into()],
            ));
            ops.push(Operation::new(
                "Tj",
                vec![Object::String(vec![byte], StringFormat::Literal)],
            ));
        }
        ops.push(Operation::new("ET", vec![]));

        let content = Content { operations: ops }
            .encode()
            .map_err(|e| EncodeError::Pdf(e.to_string()))?;

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), page_w.into(), page_h.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut buf = Vec::new();
        doc.save_to(&mut buf)
            .map_err(|e| EncodeError::Pdf(e.to_string()))?;
        log::debug!("PDF : {} octets", buf.len());
        Ok(buf)
    }
}

#[cfg(not(feature = "pdf"))]
mod backend {
    use super::{Layout, Mark, PageSize};
    use crate::error::EncodeError;
    use gc_core::frame::Grid;

    pub(super) fn write(
        _grid: &Grid,
        _marks: &[Mark],
        _page: PageSize,
        _layout: &Layout,
    ) -> Result<Vec<u8>, EncodeError> {
        Err(EncodeError::BackendUnavailable("pdf"))
    }
}
