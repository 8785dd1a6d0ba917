//! pdfdiff Render
//!
//! Composes the overlay of two page versions and writes it out:
//! - `OverlayComposer` replays paths and text in one color onto a `Shape`
//! - `area` and `rotation` hold the numeric heuristics used while replaying
//! - `pdf` writes an `OutputPage` as a one-page PDF
//! - `raster` renders an `OutputPage` to a PNG preview with tiny-skia

pub mod area;
mod composer;
mod page;
pub mod pdf;
pub mod raster;
pub mod rotation;
mod state;

pub use composer::{compose, ComposeOptions, FontLabel, OverlayComposer, DEFAULT_WIDTH_FACTOR};
pub use page::{DisplayItem, OutputPage, Segment, Shape, StyledPath, TextRun};
pub use state::{DrawState, STROKE_OPACITY, TEXT_OPACITY};

/// RGB color with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Color of the "before" document
    pub const BEFORE: Color = Color::rgb(1.0, 0.0, 0.5);
    /// Color of the "after" document
    pub const AFTER: Color = Color::rgb(0.0, 1.0, 0.5);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Components as 8-bit channels
    pub fn to_rgba8(self, alpha: f64) -> [u8; 4] {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [
            channel(self.r as f64),
            channel(self.g as f64),
            channel(self.b as f64),
            channel(alpha),
        ]
    }
}

/// Rendering error types
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Unhandled draw command in path {path}: {command}")]
    UnhandledDrawCommand { path: usize, command: String },

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding failed: {0}")]
    Png(String),

    #[error("No font available for {0}")]
    NoFont(String),

    #[error("Invalid canvas size {width}x{height}")]
    InvalidCanvas { width: f64, height: f64 },
}

pub type Result<T> = std::result::Result<T, RenderError>;
