//! Output page and the shape builder that fills it
//!
//! Drawing happens in two stages: primitives accumulate on a [`Shape`],
//! [`Shape::finish`] turns them into one styled path and
//! [`Shape::commit`] moves everything finished so far onto the page.

use pdfdiff_geom::{Matrix, Point, Quad, Rect};

use crate::composer::FontLabel;
use crate::{Color, DrawState, RenderError, Result};

/// Path element in output page space (top-left origin, y down)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    MoveTo(Point),
    LineTo(Point),
    /// Cubic bezier: two control points and the end point
    CurveTo(Point, Point, Point),
    /// Closed axis-aligned rectangle subpath
    Rect(Rect),
    Close,
}

/// Finished path with its styling
#[derive(Debug, Clone, PartialEq)]
pub struct StyledPath {
    pub segments: Vec<Segment>,
    pub state: DrawState,
}

/// Single line of text placed on the page
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Baseline origin
    pub origin: Point,
    pub text: String,
    pub size: f64,
    pub font: FontLabel,
    pub color: Color,
    /// Counterclockwise rotation in degrees
    pub rotation: u16,
    /// Scaling applied about the origin after rotation
    pub morph: Matrix,
    pub stroke_opacity: f64,
    pub fill_opacity: f64,
}

impl TextRun {
    /// Maps glyph space (origin on the baseline, y down, unscaled by the
    /// font size) to page space.
    pub fn placement(&self) -> Matrix {
        Matrix::rotate_visual(self.rotation as f64)
            .then(&self.morph)
            .then(&Matrix::translate(self.origin.x, self.origin.y))
    }
}

/// Anything drawn on the output page, in painting order
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayItem {
    Path(StyledPath),
    Text(TextRun),
}

/// Output canvas of fixed size holding committed display items
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPage {
    width: f64,
    height: f64,
    items: Vec<DisplayItem>,
}

impl OutputPage {
    /// Create an empty page; both sides must be positive and finite
    pub fn new(width: f64, height: f64) -> Result<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(width) || !valid(height) {
            return Err(RenderError::InvalidCanvas { width, height });
        }
        Ok(Self {
            width,
            height,
            items: Vec::new(),
        })
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn rect(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Committed items in painting order
    pub fn items(&self) -> &[DisplayItem] {
        &self.items
    }

    /// Start a shape drawing onto this page
    pub fn new_shape(&mut self) -> Shape<'_> {
        Shape {
            page: self,
            segments: Vec::new(),
            last: None,
            finished: Vec::new(),
        }
    }
}

/// Accumulates drawing primitives for an [`OutputPage`]
#[derive(Debug)]
pub struct Shape<'a> {
    page: &'a mut OutputPage,
    /// Segments of the path under construction
    segments: Vec<Segment>,
    last: Option<Point>,
    /// Items finished but not yet committed
    finished: Vec<DisplayItem>,
}

impl Shape<'_> {
    /// Rectangle of the page being drawn on
    pub fn page_rect(&self) -> Rect {
        self.page.rect()
    }

    /// Begin a new subpath at `p` unless the pen is already there
    fn move_to(&mut self, p: Point) {
        if self.last != Some(p) {
            self.segments.push(Segment::MoveTo(p));
        }
    }

    pub fn draw_line(&mut self, p0: Point, p1: Point) {
        self.move_to(p0);
        self.segments.push(Segment::LineTo(p1));
        self.last = Some(p1);
    }

    pub fn draw_rect(&mut self, rect: Rect) {
        self.segments.push(Segment::Rect(rect));
        // pen position after a rectangle is backend specific
        self.last = None;
    }

    /// Quad drawn as the closed polyline ul, ll, lr, ur, ul
    pub fn draw_quad(&mut self, quad: Quad) {
        let [ul, ll, lr, ur] = quad.outline();
        self.move_to(ul);
        for p in [ll, lr, ur, ul] {
            self.segments.push(Segment::LineTo(p));
        }
        self.last = Some(ul);
    }

    pub fn draw_bezier(&mut self, p0: Point, c1: Point, c2: Point, p3: Point) {
        self.move_to(p0);
        self.segments.push(Segment::CurveTo(c1, c2, p3));
        self.last = Some(p3);
    }

    /// Close off the primitives drawn since the last `finish` as one path.
    ///
    /// Does nothing when nothing was drawn.
    pub fn finish(&mut self, state: DrawState) {
        if self.segments.is_empty() {
            return;
        }
        let mut segments = std::mem::take(&mut self.segments);
        if state.close_path {
            segments.push(Segment::Close);
        }
        self.last = None;
        self.finished.push(DisplayItem::Path(StyledPath { segments, state }));
    }

    pub fn insert_text(&mut self, run: TextRun) {
        self.finished.push(DisplayItem::Text(run));
    }

    /// Move every finished item onto the page.
    ///
    /// Primitives not yet finished are discarded.
    pub fn commit(&mut self) {
        if !self.segments.is_empty() {
            tracing::debug!("Discarding {} unfinished segments", self.segments.len());
            self.segments.clear();
        }
        self.last = None;
        self.page.items.append(&mut self.finished);
    }
}
