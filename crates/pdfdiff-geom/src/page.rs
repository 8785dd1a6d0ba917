//! Source page geometry and the projection onto an output canvas

use crate::{Matrix, Point, Quad, Rect};

/// Size and intrinsic rotation of a source page.
///
/// `width`/`height` are the unrotated media box dimensions. The page as a
/// viewer sees it ([`PageGeometry::rect`]) has the sides swapped for quarter
/// turns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    rotation: u16,
}

impl PageGeometry {
    /// Create page geometry; `rotation` is normalized to 0, 90, 180 or 270
    pub fn new(width: f64, height: f64, rotation: i64) -> Self {
        let quarter_turns = rotation.div_euclid(90).rem_euclid(4);
        Self {
            width,
            height,
            rotation: (quarter_turns * 90) as u16,
        }
    }

    /// Page rotation in degrees (clockwise, as stored in the document)
    pub fn rotation(&self) -> u16 {
        self.rotation
    }

    /// The page rectangle as displayed, origin at the top-left
    pub fn rect(&self) -> Rect {
        match self.rotation {
            90 | 270 => Rect::from_size(self.height, self.width),
            _ => Rect::from_size(self.width, self.height),
        }
    }

    pub fn area(&self) -> f64 {
        self.rect().area()
    }

    /// Maps unrotated page coordinates onto the displayed page
    pub fn rotation_matrix(&self) -> Matrix {
        let (w, h) = (self.width, self.height);
        match self.rotation {
            90 => Matrix::new(0.0, 1.0, -1.0, 0.0, h, 0.0),
            180 => Matrix::new(-1.0, 0.0, 0.0, -1.0, w, h),
            270 => Matrix::new(0.0, -1.0, 1.0, 0.0, 0.0, w),
            _ => Matrix::identity(),
        }
    }
}

/// Rotation plus uniform scale from a source page onto an output canvas.
///
/// The scale compares the longer sides only; differing aspect ratios are
/// not corrected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageTransform {
    rotation: Matrix,
    scale: f64,
}

impl PageTransform {
    pub fn new(output: &Rect, page: &PageGeometry) -> Self {
        Self {
            rotation: page.rotation_matrix(),
            scale: Self::scale_factor(output, &page.rect()),
        }
    }

    /// `max(output side) / max(source side)`
    pub fn scale_factor(output: &Rect, source: &Rect) -> f64 {
        output.max_side() / source.max_side()
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn rotation(&self) -> &Matrix {
        &self.rotation
    }

    /// The combined rotate-then-scale matrix
    pub fn matrix(&self) -> Matrix {
        self.rotation.then(&Matrix::scale(self.scale, self.scale))
    }

    pub fn point(&self, p: Point) -> Point {
        p.transform(&self.rotation).scaled(self.scale)
    }

    pub fn rect(&self, r: &Rect) -> Rect {
        r.transform(&self.matrix())
    }

    pub fn quad(&self, q: &Quad) -> Quad {
        q.transform(&self.matrix())
    }

    /// Scale a length such as a line width or font size
    pub fn length(&self, value: f64) -> f64 {
        value * self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A4: (f64, f64) = (595.0, 842.0);

    #[test]
    fn test_rotation_normalized() {
        assert_eq!(PageGeometry::new(1.0, 1.0, 0).rotation(), 0);
        assert_eq!(PageGeometry::new(1.0, 1.0, 450).rotation(), 90);
        assert_eq!(PageGeometry::new(1.0, 1.0, -90).rotation(), 270);
    }

    #[test]
    fn test_rotated_rect_swaps_sides() {
        let page = PageGeometry::new(A4.0, A4.1, 90);
        assert_eq!(page.rect(), Rect::from_size(A4.1, A4.0));
        assert_eq!(page.area(), A4.0 * A4.1);
    }

    #[test]
    fn test_rotation_matrix_keeps_page_on_canvas() {
        for rotation in [0, 90, 180, 270] {
            let page = PageGeometry::new(A4.0, A4.1, rotation);
            let mapped = Rect::from_size(A4.0, A4.1).transform(&page.rotation_matrix());
            assert_eq!(mapped, page.rect(), "rotation {rotation}");
        }
    }

    #[test]
    fn test_top_left_moves_to_top_right_at_90() {
        let page = PageGeometry::new(A4.0, A4.1, 90);
        let p = Point::new(0.0, 0.0).transform(&page.rotation_matrix());
        assert_eq!(p, Point::new(A4.1, 0.0));
    }

    #[test]
    fn test_scale_same_size_is_one() {
        let page = PageGeometry::new(A4.0, A4.1, 0);
        let t = PageTransform::new(&page.rect(), &page);
        assert_eq!(t.scale(), 1.0);
        assert_eq!(t.point(Point::new(10.0, 20.0)), Point::new(10.0, 20.0));
    }

    #[test]
    fn test_scale_is_idempotent() {
        let output = Rect::from_size(300.0, 400.0);
        let source = Rect::from_size(600.0, 800.0);
        let first = PageTransform::scale_factor(&output, &source);
        let second = PageTransform::scale_factor(&output, &source);
        assert_eq!(first, second);
        assert_eq!(first, 0.5);
    }

    #[test]
    fn test_scale_uses_longer_sides() {
        // landscape output, portrait source: no aspect correction
        let output = Rect::from_size(842.0, 595.0);
        let source = Rect::from_size(297.5, 421.0);
        assert_eq!(PageTransform::scale_factor(&output, &source), 2.0);
    }

    #[test]
    fn test_transform_rotates_then_scales() {
        let output = Rect::from_size(421.0, 297.5);
        let page = PageGeometry::new(595.0, 842.0, 90);
        let t = PageTransform::new(&output, &page);
        assert_eq!(t.scale(), 0.5);
        assert_eq!(t.point(Point::new(0.0, 0.0)), Point::new(421.0, 0.0));
        assert_eq!(t.length(2.0), 1.0);
        let r = t.rect(&Rect::new(0.0, 0.0, 10.0, 20.0));
        assert_eq!(r, Rect::new(411.0, 0.0, 421.0, 5.0));
    }
}
