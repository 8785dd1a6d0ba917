//! Draw state attached to each committed path

use pdfdiff_content::{DashPattern, VectorPath};

use crate::area::{fill_opacity, path_area};
use crate::Color;

/// Stroke opacity of every redrawn path
pub const STROKE_OPACITY: f64 = 0.5;

/// Stroke and fill opacity of redrawn text
pub const TEXT_OPACITY: f64 = 0.5;

/// Styling for one finished path
#[derive(Debug, Clone, PartialEq)]
pub struct DrawState {
    /// Fill color; `None` leaves the path unfilled
    pub fill: Option<Color>,
    pub stroke: Color,
    pub dashes: Option<DashPattern>,
    pub even_odd: bool,
    pub close_path: bool,
    pub line_join: u8,
    pub line_cap: u8,
    pub width: f64,
    pub stroke_opacity: f64,
    pub fill_opacity: f64,
}

impl DrawState {
    /// Derive the state for redrawing `path` in `color`.
    ///
    /// `scale` is the page-to-canvas factor applied to the line width and
    /// `page_area` the source page area the fill heuristic compares against.
    pub fn for_path(path: &VectorPath, color: Color, scale: f64, page_area: f64) -> Self {
        let line_cap = path
            .line_caps
            .as_deref()
            .and_then(|caps| caps.iter().copied().max())
            .unwrap_or(0);

        Self {
            fill: path.fill.then_some(color),
            stroke: color,
            dashes: path.dashes.clone(),
            even_odd: path.even_odd.unwrap_or(true),
            close_path: path.close_path,
            line_join: path.line_join.unwrap_or(0),
            line_cap,
            width: path.width.unwrap_or(0.0) * scale,
            stroke_opacity: STROKE_OPACITY,
            fill_opacity: fill_opacity(path_area(path), page_area),
        }
    }

    /// A zero width means the outline is not drawn
    pub fn has_stroke(&self) -> bool {
        self.width > 0.0
    }

    pub fn has_fill(&self) -> bool {
        self.fill.is_some()
    }
}
