//! Overlay composition
//!
//! Replays one page's paths and text in a single color onto a shared
//! [`Shape`]. Calling [`OverlayComposer::render`] once per color on the same
//! shape builds the overlay.

use std::fmt;
use std::str::FromStr;

use pdfdiff_content::{ContentSource, DrawCommand};
use pdfdiff_geom::{Matrix, PageTransform};

use crate::rotation::quantized_rotation;
use crate::{Color, DrawState, OutputPage, RenderError, Result, Shape, TextRun, TEXT_OPACITY};

/// Default horizontal squeeze of redrawn text
pub const DEFAULT_WIDTH_FACTOR: f64 = 0.7;

/// Font used for redrawn text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FontLabel {
    /// CJK-capable font
    #[default]
    Japan,
    /// Helvetica
    Helv,
}

impl FontLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FontLabel::Japan => "japan",
            FontLabel::Helv => "helv",
        }
    }
}

impl fmt::Display for FontLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FontLabel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "japan" => Ok(FontLabel::Japan),
            "helv" => Ok(FontLabel::Helv),
            other => Err(format!("unknown font '{other}' (expected 'japan' or 'helv')")),
        }
    }
}

/// Composition settings shared by both colors
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeOptions {
    /// Squeeze applied to text along its baseline
    pub width_factor: f64,
    pub draw_text: bool,
    pub font: FontLabel,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            width_factor: DEFAULT_WIDTH_FACTOR,
            draw_text: true,
            font: FontLabel::default(),
        }
    }
}

/// Redraws page content in one color
#[derive(Debug, Clone, Default)]
pub struct OverlayComposer {
    options: ComposeOptions,
}

impl OverlayComposer {
    pub fn new(options: ComposeOptions) -> Self {
        Self { options }
    }

    /// Draw every path, then every text span, of `source` in `color`.
    ///
    /// Paths and text are committed as two separate batches. An
    /// unsupported draw command aborts before anything of this call is
    /// committed.
    pub fn render(&self, shape: &mut Shape<'_>, source: &dyn ContentSource, color: Color) -> Result<()> {
        let geometry = source.geometry();
        let transform = PageTransform::new(&shape.page_rect(), &geometry);

        self.render_paths(shape, source, color, &transform, geometry.area())?;
        shape.commit();

        if self.options.draw_text {
            self.render_text(shape, source, color, &transform);
            shape.commit();
        }
        Ok(())
    }

    fn render_paths(
        &self,
        shape: &mut Shape<'_>,
        source: &dyn ContentSource,
        color: Color,
        transform: &PageTransform,
        page_area: f64,
    ) -> Result<()> {
        for (index, path) in source.paths().iter().enumerate() {
            for command in &path.commands {
                match command {
                    DrawCommand::Line(p0, p1) => shape.draw_line(transform.point(*p0), transform.point(*p1)),
                    DrawCommand::Rect(rect) => shape.draw_rect(transform.rect(rect)),
                    DrawCommand::Quad(quad) => shape.draw_quad(transform.quad(quad)),
                    DrawCommand::Curve(p0, p1, p2, p3) => shape.draw_bezier(
                        transform.point(*p0),
                        transform.point(*p1),
                        transform.point(*p2),
                        transform.point(*p3),
                    ),
                    DrawCommand::Unsupported { .. } => {
                        return Err(RenderError::UnhandledDrawCommand {
                            path: index,
                            command: command.kind().to_string(),
                        });
                    }
                }
            }
            shape.finish(DrawState::for_path(path, color, transform.scale(), page_area));
        }
        tracing::debug!("Replayed {} paths", source.paths().len());
        Ok(())
    }

    fn render_text(&self, shape: &mut Shape<'_>, source: &dyn ContentSource, color: Color, transform: &PageTransform) {
        let mut spans = 0;
        for line in source.blocks().iter().flat_map(|block| &block.lines) {
            let rotation = quantized_rotation(line.dir, transform.rotation());
            let morph = self.morph(rotation);
            for span in &line.spans {
                shape.insert_text(TextRun {
                    origin: transform.point(span.origin),
                    text: span.text.clone(),
                    size: transform.length(span.size),
                    font: self.options.font,
                    color,
                    rotation,
                    morph,
                    stroke_opacity: TEXT_OPACITY,
                    fill_opacity: TEXT_OPACITY,
                });
                spans += 1;
            }
        }
        tracing::debug!("Replayed {} text spans", spans);
    }

    /// Squeeze along the baseline: x for upright text, y for sideways text
    pub fn morph(&self, rotation: u16) -> Matrix {
        let wf = self.options.width_factor;
        if rotation % 180 == 0 {
            Matrix::scale(wf, 1.0)
        } else {
            Matrix::scale(1.0, wf)
        }
    }
}

/// Overlay `before` in red and `after` in green on a page the size of
/// `before`'s displayed page.
pub fn compose(before: &dyn ContentSource, after: &dyn ContentSource, options: &ComposeOptions) -> Result<OutputPage> {
    let rect = before.geometry().rect();
    let mut page = OutputPage::new(rect.width(), rect.height())?;
    let composer = OverlayComposer::new(options.clone());
    {
        let mut shape = page.new_shape();
        composer.render(&mut shape, before, Color::BEFORE)?;
        composer.render(&mut shape, after, Color::AFTER)?;
    }
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DisplayItem;
    use pdfdiff_content::{PageContent, PageGeometry, TextBlock, TextLine, TextSpan, VectorPath};
    use pdfdiff_geom::{Point, Rect};

    fn page_with_rect(geometry: PageGeometry) -> PageContent {
        let mut content = PageContent::new(geometry);
        let mut path = VectorPath::new(vec![DrawCommand::Rect(Rect::new(10.0, 20.0, 30.0, 40.0))]);
        path.fill = true;
        content.paths.push(path);
        content
    }

    fn page_with_text(geometry: PageGeometry, dir: Point) -> PageContent {
        let mut content = PageContent::new(geometry);
        content.blocks.push(TextBlock {
            lines: vec![TextLine {
                dir,
                spans: vec![TextSpan {
                    origin: Point::new(10.0, 20.0),
                    text: "abc".into(),
                    size: 12.0,
                }],
            }],
        });
        content
    }

    #[test]
    fn test_font_label_parse() {
        assert_eq!("japan".parse::<FontLabel>(), Ok(FontLabel::Japan));
        assert_eq!("HELV".parse::<FontLabel>(), Ok(FontLabel::Helv));
        assert!("courier".parse::<FontLabel>().is_err());
        assert_eq!(FontLabel::Helv.to_string(), "helv");
    }

    #[test]
    fn test_morph_axis() {
        let composer = OverlayComposer::default();
        assert_eq!(composer.morph(0), Matrix::scale(0.7, 1.0));
        assert_eq!(composer.morph(180), Matrix::scale(0.7, 1.0));
        assert_eq!(composer.morph(90), Matrix::scale(1.0, 0.7));
    }

    #[test]
    fn test_render_scales_to_canvas() {
        let source = page_with_rect(PageGeometry::new(200.0, 100.0, 0));
        let mut page = OutputPage::new(100.0, 50.0).unwrap();
        let mut shape = page.new_shape();
        OverlayComposer::default()
            .render(&mut shape, &source, Color::BEFORE)
            .unwrap();
        drop(shape);

        match &page.items()[0] {
            DisplayItem::Path(path) => {
                assert_eq!(path.segments, vec![crate::Segment::Rect(Rect::new(5.0, 10.0, 15.0, 20.0))]);
                assert_eq!(path.state.fill, Some(Color::BEFORE));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_text_disabled() {
        let source = page_with_text(PageGeometry::new(100.0, 100.0, 0), Point::new(1.0, 0.0));
        let options = ComposeOptions { draw_text: false, ..Default::default() };
        let page = compose(&source, &source, &options).unwrap();
        assert!(page.items().is_empty());
    }

    #[test]
    fn test_text_runs_for_both_colors() {
        let source = page_with_text(PageGeometry::new(100.0, 100.0, 0), Point::new(0.0, 1.0));
        let page = compose(&source, &source, &ComposeOptions::default()).unwrap();
        let runs: Vec<_> = page
            .items()
            .iter()
            .filter_map(|item| match item {
                DisplayItem::Text(run) => Some(run),
                _ => None,
            })
            .collect();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].color, Color::BEFORE);
        assert_eq!(runs[1].color, Color::AFTER);
        assert_eq!(runs[0].rotation, 90);
        assert_eq!(runs[0].morph, Matrix::scale(1.0, 0.7));
        assert_eq!(runs[0].size, 12.0);
        assert_eq!(runs[0].font, FontLabel::Japan);
        assert_eq!(runs[0].fill_opacity, 0.5);
    }

    #[test]
    fn test_output_page_follows_before_rotation() {
        let before = PageContent::new(PageGeometry::new(200.0, 100.0, 90));
        let after = PageContent::new(PageGeometry::new(200.0, 100.0, 90));
        let page = compose(&before, &after, &ComposeOptions::default()).unwrap();
        assert_eq!((page.width(), page.height()), (100.0, 200.0));
    }

    #[test]
    fn test_unsupported_command_fails() {
        let mut source = page_with_rect(PageGeometry::new(100.0, 100.0, 0));
        source.paths.push(VectorPath::new(vec![DrawCommand::Unsupported { operator: "BT".into() }]));
        let err = compose(&source, &source, &ComposeOptions::default()).unwrap_err();
        match err {
            RenderError::UnhandledDrawCommand { path, command } => {
                assert_eq!(path, 1);
                assert_eq!(command, "BT");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
