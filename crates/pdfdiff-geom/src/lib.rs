//! pdfdiff Geometry
//!
//! Plain geometry shared by the extraction and rendering crates.
//!
//! This crate provides:
//! - `Point`, `Rect` and `Quad` in top-left-origin page space
//! - `Matrix`, a 2D affine transform in row-vector form
//! - `PageGeometry`, a source page's size and intrinsic rotation
//! - `PageTransform`, the rotation + uniform scale onto an output canvas

mod matrix;
mod page;
mod shapes;

pub use matrix::Matrix;
pub use page::{PageGeometry, PageTransform};
pub use shapes::{Point, Quad, Rect};

/// Tolerance used for geometric comparisons
pub const EPSILON: f64 = 1e-9;
