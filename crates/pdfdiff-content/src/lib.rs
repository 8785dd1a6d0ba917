//! pdfdiff Content
//!
//! Extracts what the overlay needs from one document page:
//! - the ordered list of vector paths (lines, rectangles, quads, curves)
//!   with their stroke/fill attributes
//! - the block → line → span text hierarchy with origins, sizes and
//!   baseline directions
//!
//! Coordinates are reported in unrotated page space with the origin at the
//! top-left corner and y growing downwards.

mod model;
pub mod pdf;

pub use model::{ContentSource, DashPattern, DrawCommand, PageContent, TextBlock, TextLine, TextSpan, VectorPath};
pub use pdf::{PdfDocument, MAX_FORM_DEPTH};
pub use pdfdiff_geom::PageGeometry;

/// Content extraction error
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Page {index} out of range (document has {count} pages)")]
    PageOutOfRange { index: usize, count: usize },

    #[error("Invalid operand {index} for operator '{operator}'")]
    InvalidOperand { operator: String, index: usize },

    #[error("Page has no usable MediaBox")]
    MissingMediaBox,
}

pub type Result<T> = std::result::Result<T, ContentError>;
