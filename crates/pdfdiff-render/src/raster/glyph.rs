//! Glyph outlines for raster text
//!
//! Fonts are located with fontdb and outlined with ttf-parser; outlines are
//! converted straight into tiny-skia paths.


use fontdb::{Database, Family, Query, ID};
use ttf_parser::{Face, OutlineBuilder};

use crate::{FontLabel, RenderError, Result};

/// Families tried, in order, for each font label
fn families(label: FontLabel) -> &'static [&'static str] {
    match label {
        FontLabel::Japan => &[
            "Noto Sans CJK JP",
            "Noto Sans JP",
            "Source Han Sans JP",
            "IPAGothic",
            "IPAexGothic",
            "Hiragino Sans",
            "Yu Gothic",
            "MS Gothic",
            "Droid Sans Fallback",
        ],
        FontLabel::Helv => &["Helvetica", "Arial", "Liberation Sans", "Nimbus Sans", "DejaVu Sans"],
    }
}

/// Font collection used to outline text
pub struct FontBook {
    db: Database,
}

impl FontBook {
    /// Empty collection
    pub fn new() -> Self {
        Self { db: Database::new() }
    }

    /// Collection with the system fonts loaded
    pub fn with_system_fonts() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        tracing::debug!("Loaded {} system font faces", db.len());
        Self { db }
    }

    /// Face to use for `label`, falling back to any sans-serif face
    pub fn find(&self, label: FontLabel) -> Result<ID> {
        let mut names: Vec<Family<'_>> = families(label).iter().map(|name| Family::Name(name)).collect();
        names.push(Family::SansSerif);

        self.db
            .query(&Query {
                families: &names,
                ..Query::default()
            })
            .or_else(|| self.db.faces().next().map(|face| face.id))
            .ok_or_else(|| RenderError::NoFont(label.to_string()))
    }

    /// Run `f` with the parsed face `id`
    pub fn with_face<R>(&self, id: ID, f: impl FnOnce(&Face<'_>) -> R) -> Option<R> {
        self.db
            .with_face_data(id, |data, index| Face::parse(data, index).ok().map(|face| f(&face)))
            .flatten()
    }
}

impl Default for FontBook {
    fn default() -> Self {
        Self::new()
    }
}

/// Outline of a run of glyphs, in units of the font size
pub struct GlyphOutline {
    builder: tiny_skia::PathBuilder,
    /// Font units → em
    scale: f32,
    /// Pen position in em
    pen_x: f32,
}

impl GlyphOutline {
    fn new(units_per_em: u16) -> Self {
        Self {
            builder: tiny_skia::PathBuilder::new(),
            scale: 1.0 / f32::from(units_per_em.max(1)),
            pen_x: 0.0,
        }
    }

    /// Outline `text` laid out on a baseline starting at the origin, y down.
    ///
    /// Characters the face lacks advance by half an em.
    pub fn layout(face: &Face<'_>, text: &str) -> Option<tiny_skia::Path> {
        let mut outline = GlyphOutline::new(face.units_per_em());
        for c in text.chars() {
            match face.glyph_index(c) {
                Some(glyph) => {
                    face.outline_glyph(glyph, &mut outline);
                    let advance = face.glyph_hor_advance(glyph).unwrap_or(0);
                    outline.pen_x += f32::from(advance) * outline.scale;
                }
                None => outline.pen_x += 0.5,
            }
        }
        outline.builder.finish()
    }

    fn x(&self, x: f32) -> f32 {
        self.pen_x + x * self.scale
    }

    fn y(&self, y: f32) -> f32 {
        -y * self.scale
    }
}

impl OutlineBuilder for GlyphOutline {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(self.x(x), self.y(y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(self.x(x), self.y(y));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(self.x(x1), self.y(y1), self.x(x), self.y(y));
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder
            .cubic_to(self.x(x1), self.y(y1), self.x(x2), self.y(y2), self.x(x), self.y(y));
    }

    fn close(&mut self) {
        self.builder.close();
    }
}
