//! Points, rectangles and quads

use crate::Matrix;

/// Point (or free vector) in page space
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length when used as a vector
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Unit vector in the same direction, or `None` for a zero vector
    pub fn unit(&self) -> Option<Point> {
        let len = self.length();
        if len == 0.0 || !len.is_finite() {
            return None;
        }
        Some(Point::new(self.x / len, self.y / len))
    }

    pub fn transform(&self, m: &Matrix) -> Point {
        m.transform_point(*self)
    }

    /// Multiply both coordinates by `s`
    pub fn scaled(&self, s: f64) -> Point {
        Point::new(self.x * s, self.y * s)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

/// Axis-aligned rectangle given by two corners
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Rectangle anchored at the origin
    pub const fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Smallest rectangle containing all `points`
    pub fn bounding(points: &[Point]) -> Rect {
        let mut rect = Rect::new(f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            rect.x0 = rect.x0.min(p.x);
            rect.y0 = rect.y0.min(p.y);
            rect.x1 = rect.x1.max(p.x);
            rect.y1 = rect.y1.max(p.y);
        }
        rect
    }

    pub fn width(&self) -> f64 {
        (self.x1 - self.x0).abs()
    }

    pub fn height(&self) -> f64 {
        (self.y1 - self.y0).abs()
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// The longer of the two sides
    pub fn max_side(&self) -> f64 {
        self.width().max(self.height())
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Corners in order top-left, top-right, bottom-left, bottom-right
    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.x0, self.y0),
            Point::new(self.x1, self.y0),
            Point::new(self.x0, self.y1),
            Point::new(self.x1, self.y1),
        ]
    }

    /// Bounding rectangle of the transformed corners
    pub fn transform(&self, m: &Matrix) -> Rect {
        let corners = self.corners().map(|p| m.transform_point(p));
        Rect::bounding(&corners)
    }
}

/// Four-cornered shape; a rectangle that may have been rotated or sheared
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Quad {
    pub ul: Point,
    pub ur: Point,
    pub ll: Point,
    pub lr: Point,
}

impl Quad {
    pub const fn new(ul: Point, ur: Point, ll: Point, lr: Point) -> Self {
        Self { ul, ur, ll, lr }
    }

    /// Corners in drawing order: ul, ll, lr, ur
    pub fn outline(&self) -> [Point; 4] {
        [self.ul, self.ll, self.lr, self.ur]
    }

    pub fn transform(&self, m: &Matrix) -> Quad {
        Quad {
            ul: m.transform_point(self.ul),
            ur: m.transform_point(self.ur),
            ll: m.transform_point(self.ll),
            lr: m.transform_point(self.lr),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::bounding(&[self.ul, self.ur, self.ll, self.lr])
    }
}

impl From<Rect> for Quad {
    fn from(rect: Rect) -> Self {
        let [ul, ur, ll, lr] = rect.corners();
        Quad { ul, ur, ll, lr }
    }
}
