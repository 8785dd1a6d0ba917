//! Raster output
//!
//! Renders an [`OutputPage`] onto a white tiny-skia pixmap, `zoom` pixels
//! per page unit.

mod glyph;

pub use glyph::{FontBook, GlyphOutline};

use std::path::Path;

use pdfdiff_geom::Matrix;
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, StrokeDash, Transform};

use crate::{Color, DisplayItem, OutputPage, RenderError, Result, Segment, StyledPath, TextRun};

/// Default pixels per page unit
pub const DEFAULT_ZOOM: f32 = 2.0;

/// Pixmap size for `page` at `zoom`
pub fn pixel_size(page: &OutputPage, zoom: f32) -> (u32, u32) {
    let side = |v: f64| ((v * zoom as f64).ceil() as u32).max(1);
    (side(page.width()), side(page.height()))
}

/// Render `page` with fonts from `fonts`
pub fn render_pixmap(page: &OutputPage, zoom: f32, fonts: &FontBook) -> Result<Pixmap> {
    let (width, height) = pixel_size(page, zoom);
    let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::InvalidCanvas {
        width: page.width(),
        height: page.height(),
    })?;
    pixmap.fill(tiny_skia::Color::WHITE);

    let mut painter = Painter {
        pixmap: &mut pixmap,
        zoom,
        fonts,
    };
    for item in page.items() {
        match item {
            DisplayItem::Path(path) => painter.path(path),
            DisplayItem::Text(run) => painter.text(run)?,
        }
    }
    Ok(pixmap)
}

/// Render `page` and save it as PNG at `path`.
///
/// System fonts are only loaded when the page carries text.
pub fn save_png(page: &OutputPage, path: &Path, zoom: f32) -> Result<()> {
    let has_text = page.items().iter().any(|item| matches!(item, DisplayItem::Text(_)));
    let fonts = if has_text {
        FontBook::with_system_fonts()
    } else {
        FontBook::new()
    };
    let pixmap = render_pixmap(page, zoom, &fonts)?;
    pixmap.save_png(path).map_err(|e| RenderError::Png(e.to_string()))?;
    tracing::debug!("Wrote {}x{} PNG to {}", pixmap.width(), pixmap.height(), path.display());
    Ok(())
}

fn to_transform(m: &Matrix) -> Transform {
    Transform::from_row(m.a as f32, m.b as f32, m.c as f32, m.d as f32, m.e as f32, m.f as f32)
}

fn paint(color: Color, opacity: f64) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba8(opacity);
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

struct Painter<'a> {
    pixmap: &'a mut Pixmap,
    zoom: f32,
    fonts: &'a FontBook,
}

impl Painter<'_> {
    fn path(&mut self, styled: &StyledPath) {
        let mut builder = PathBuilder::new();
        for segment in &styled.segments {
            match *segment {
                Segment::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
                Segment::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
                Segment::CurveTo(c1, c2, p) => builder.cubic_to(
                    c1.x as f32,
                    c1.y as f32,
                    c2.x as f32,
                    c2.y as f32,
                    p.x as f32,
                    p.y as f32,
                ),
                Segment::Rect(r) => {
                    if let Some(rect) = tiny_skia::Rect::from_ltrb(r.x0 as f32, r.y0 as f32, r.x1 as f32, r.y1 as f32) {
                        builder.push_rect(rect);
                    }
                }
                Segment::Close => builder.close(),
            }
        }
        let Some(path) = builder.finish() else {
            return;
        };

        let state = &styled.state;
        let transform = Transform::from_scale(self.zoom, self.zoom);
        if let Some(color) = state.fill {
            let rule = if state.even_odd { FillRule::EvenOdd } else { FillRule::Winding };
            self.pixmap
                .fill_path(&path, &paint(color, state.fill_opacity), rule, transform, None);
        }
        if state.has_stroke() {
            let stroke = Stroke {
                width: state.width as f32,
                line_cap: match state.line_cap {
                    1 => LineCap::Round,
                    2 => LineCap::Square,
                    _ => LineCap::Butt,
                },
                line_join: match state.line_join {
                    1 => LineJoin::Round,
                    2 => LineJoin::Bevel,
                    _ => LineJoin::Miter,
                },
                dash: state.dashes.as_ref().and_then(|d| {
                    let mut array: Vec<f32> = d.array.iter().map(|v| *v as f32).collect();
                    if array.len() % 2 == 1 {
                        array.extend_from_within(..);
                    }
                    StrokeDash::new(array, d.phase as f32)
                }),
                ..Stroke::default()
            };
            self.pixmap
                .stroke_path(&path, &paint(state.stroke, state.stroke_opacity), &stroke, transform, None);
        }
    }

    fn text(&mut self, run: &TextRun) -> Result<()> {
        let id = self.fonts.find(run.font)?;
        let outline = self
            .fonts
            .with_face(id, |face| GlyphOutline::layout(face, &run.text))
            .ok_or_else(|| RenderError::NoFont(run.font.to_string()))?;
        let Some(outline) = outline else {
            // whitespace only
            return Ok(());
        };

        let m = Matrix::scale(run.size, run.size)
            .then(&run.placement())
            .then(&Matrix::scale(self.zoom as f64, self.zoom as f64));
        self.pixmap.fill_path(
            &outline,
            &paint(run.color, run.fill_opacity),
            FillRule::Winding,
            to_transform(&m),
            None,
        );
        Ok(())
    }
}
