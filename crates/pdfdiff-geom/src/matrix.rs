//! Affine matrices
//!
//! Row-vector convention, the same one PDF content streams use:
//!
//! ```text
//! [x' y' 1] = [x y 1] | a b 0 |
//!                     | c d 0 |
//!                     | e f 1 |
//! ```

use crate::{Point, EPSILON};

/// 2D affine transformation matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl Matrix {
    /// Identity transform
    pub const fn identity() -> Self {
        Self {
            a: 1.0, b: 0.0,
            c: 0.0, d: 1.0,
            e: 0.0, f: 0.0,
        }
    }

    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Translation transform
    pub const fn translate(tx: f64, ty: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Scale transform
    pub const fn scale(sx: f64, sy: f64) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    /// Counterclockwise rotation as seen on a page whose y axis points down.
    ///
    /// Quarter turns are exact so that rotated coordinates stay integral.
    pub fn rotate_visual(degrees: f64) -> Self {
        let (sin, cos) = match degrees.rem_euclid(360.0) {
            d if d == 0.0 => (0.0, 1.0),
            d if d == 90.0 => (1.0, 0.0),
            d if d == 180.0 => (0.0, -1.0),
            d if d == 270.0 => (-1.0, 0.0),
            d => d.to_radians().sin_cos(),
        };
        Self::new(cos, -sin, sin, cos, 0.0, 0.0)
    }

    /// Returns the transform that applies `self` first and then `other`
    pub fn then(&self, other: &Matrix) -> Self {
        Self {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Apply the transform to a point
    pub fn transform_point(&self, p: Point) -> Point {
        Point::new(
            p.x * self.a + p.y * self.c + self.e,
            p.x * self.b + p.y * self.d + self.f,
        )
    }

    /// Apply only the linear part (direction vectors, sizes)
    pub fn transform_vector(&self, v: Point) -> Point {
        Point::new(v.x * self.a + v.y * self.c, v.x * self.b + v.y * self.d)
    }

    pub fn determinant(&self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// Average length scaling of the linear part
    pub fn expansion(&self) -> f64 {
        self.determinant().abs().sqrt()
    }

    /// True when axis-aligned rectangles stay axis-aligned
    pub fn is_rectilinear(&self) -> bool {
        (self.b.abs() < EPSILON && self.c.abs() < EPSILON)
            || (self.a.abs() < EPSILON && self.d.abs() < EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let p = Point::new(3.0, 4.0);
        assert_eq!(Matrix::identity().transform_point(p), p);
        assert_eq!(Matrix::default(), Matrix::identity());
    }

    #[test]
    fn test_then_order() {
        // scale first, then translate
        let m = Matrix::scale(2.0, 2.0).then(&Matrix::translate(10.0, 0.0));
        assert_eq!(m.transform_point(Point::new(1.0, 1.0)), Point::new(12.0, 2.0));

        // translate first, then scale
        let m = Matrix::translate(10.0, 0.0).then(&Matrix::scale(2.0, 2.0));
        assert_eq!(m.transform_point(Point::new(1.0, 1.0)), Point::new(22.0, 2.0));
    }

    #[test]
    fn test_vector_ignores_translation() {
        let m = Matrix::new(0.0, 1.0, -1.0, 0.0, 500.0, 0.0);
        assert_eq!(m.transform_vector(Point::new(1.0, 0.0)), Point::new(0.0, 1.0));
    }

    #[test]
    fn test_rotate_visual_quarter_turn() {
        // x axis turns to "up", which is -y on a y-down page
        let m = Matrix::rotate_visual(90.0);
        assert_eq!(m.transform_vector(Point::new(1.0, 0.0)), Point::new(0.0, -1.0));
        let full = Matrix::rotate_visual(360.0).transform_vector(Point::new(1.0, 0.0));
        assert!((full.x - 1.0).abs() < EPSILON && full.y.abs() < EPSILON);
    }

    #[test]
    fn test_rectilinear() {
        assert!(Matrix::scale(2.0, -1.0).is_rectilinear());
        assert!(Matrix::new(0.0, 1.0, -1.0, 0.0, 0.0, 0.0).is_rectilinear());
        assert!(!Matrix::rotate_visual(30.0).is_rectilinear());
    }

    #[test]
    fn test_expansion() {
        assert!((Matrix::scale(2.0, 8.0).expansion() - 4.0).abs() < 1e-12);
    }
}
