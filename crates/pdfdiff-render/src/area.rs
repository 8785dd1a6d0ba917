//! Filled-area estimate used to pick a fill opacity

use pdfdiff_content::{DrawCommand, VectorPath};
use pdfdiff_geom::Point;

/// Area ratio (path / page) above which a fill counts as large
pub const AREA_RATIO_THRESHOLD: f64 = 1e-4;

/// Fill opacity of large regions, so the other color stays visible beneath
pub const LARGE_FILL_OPACITY: f64 = 0.1;

/// Fill opacity of small, glyph-like regions
pub const SMALL_FILL_OPACITY: f64 = 0.5;

/// Unsigned area enclosed by the points of a filled path.
///
/// Points of every non-rectangle command are joined in emission order and
/// measured with the shoelace formula. Rectangles contribute nothing, so a
/// path made only of rectangles has area 0. Unfilled paths have area 0.
pub fn path_area(path: &VectorPath) -> f64 {
    if !path.fill {
        return 0.0;
    }

    let mut points: Vec<Point> = Vec::new();
    for command in &path.commands {
        match command {
            DrawCommand::Line(p0, p1) => points.extend([*p0, *p1]),
            DrawCommand::Curve(p0, p1, p2, p3) => points.extend([*p0, *p1, *p2, *p3]),
            DrawCommand::Quad(quad) => points.extend(quad.outline()),
            DrawCommand::Rect(_) | DrawCommand::Unsupported { .. } => {}
        }
    }
    shoelace(&points)
}

/// `|Σ (xᵢ − xᵢ₋₁)(yᵢ + yᵢ₋₁)| / 2`, with the first point's predecessor
/// being the last one
fn shoelace(points: &[Point]) -> f64 {
    let Some(mut prev) = points.last().copied() else {
        return 0.0;
    };
    let mut sum = 0.0;
    for p in points {
        sum += (p.x - prev.x) * (p.y + prev.y);
        prev = *p;
    }
    sum.abs() / 2.0
}

/// Fill opacity for a path of `area` on a page of `page_area`
pub fn fill_opacity(area: f64, page_area: f64) -> f64 {
    if area / page_area > AREA_RATIO_THRESHOLD {
        LARGE_FILL_OPACITY
    } else {
        SMALL_FILL_OPACITY
    }
}
