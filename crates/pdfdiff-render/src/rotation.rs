//! Text line rotation snapped to quarter turns

use std::f64::consts::PI;

use pdfdiff_geom::{Matrix, Point};

/// Rotation in degrees of a text line running along `dir`.
///
/// The direction is mapped through the linear part of the page rotation
/// and its x component read as a cosine, so only 0, 90 and 180 can come
/// out: a line pointing up and one pointing down both give 90. Halfway
/// directions round to the even quarter. A zero direction yields 0.
pub fn quantized_rotation(dir: Point, page_rotation: &Matrix) -> u16 {
    let Some(unit) = page_rotation.transform_vector(dir).unit() else {
        return 0;
    };
    let quarters = (unit.x.clamp(-1.0, 1.0).acos() / PI * 2.0).round_ties_even();
    quarters as u16 * 90
}
