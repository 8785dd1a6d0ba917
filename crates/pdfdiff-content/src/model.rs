//! Extracted page content

use pdfdiff_geom::{PageGeometry, Point, Quad, Rect};

/// Single drawing command of a vector path
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Straight line from `p0` to `p1`
    Line(Point, Point),
    /// Axis-aligned rectangle
    Rect(Rect),
    /// Rectangle distorted by a rotation or shear
    Quad(Quad),
    /// Cubic bezier curve: start, two control points, end
    Curve(Point, Point, Point, Point),
    /// Content that could not be expressed as one of the kinds above
    Unsupported { operator: String },
}

impl DrawCommand {
    /// Short tag naming the command kind
    pub fn kind(&self) -> &str {
        match self {
            DrawCommand::Line(..) => "l",
            DrawCommand::Rect(..) => "re",
            DrawCommand::Quad(..) => "qu",
            DrawCommand::Curve(..) => "c",
            DrawCommand::Unsupported { operator } => operator,
        }
    }
}

/// Line dash pattern: dash/gap lengths and the starting phase
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashPattern {
    pub array: Vec<f64>,
    pub phase: f64,
}

impl DashPattern {
    /// A solid line is an empty dash array
    pub fn is_solid(&self) -> bool {
        self.array.is_empty() || self.array.iter().all(|v| *v <= 0.0)
    }
}

/// Vector path as painted by the document
///
/// Stroke attributes (`line_join`, `line_caps`, `width`) are only present
/// for stroked paths; `even_odd` only for filled ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorPath {
    pub commands: Vec<DrawCommand>,
    /// Whether the path is filled
    pub fill: bool,
    pub dashes: Option<DashPattern>,
    pub even_odd: Option<bool>,
    pub close_path: bool,
    pub line_join: Option<u8>,
    /// Cap styles (start, end, dash); the widest one wins when redrawn
    pub line_caps: Option<Vec<u8>>,
    pub width: Option<f64>,
}

impl VectorPath {
    pub fn new(commands: Vec<DrawCommand>) -> Self {
        Self {
            commands,
            ..Default::default()
        }
    }
}

/// Run of text sharing one font size
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// Baseline origin of the first glyph
    pub origin: Point,
    pub text: String,
    pub size: f64,
}

/// Spans sharing one baseline direction
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    /// Unit vector along the baseline
    pub dir: Point,
    pub spans: Vec<TextSpan>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<TextLine>,
}

/// Supplies the drawing and text model of one page
pub trait ContentSource {
    fn geometry(&self) -> PageGeometry;

    /// Vector paths in painting order
    fn paths(&self) -> &[VectorPath];

    fn blocks(&self) -> &[TextBlock];
}

/// Everything extracted from one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageContent {
    pub geometry: PageGeometry,
    pub paths: Vec<VectorPath>,
    pub blocks: Vec<TextBlock>,
}

impl PageContent {
    /// Empty page of the given geometry
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            paths: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Iterate all text lines across blocks
    pub fn lines(&self) -> impl Iterator<Item = &TextLine> {
        self.blocks.iter().flat_map(|b| b.lines.iter())
    }

    /// Iterate all spans across blocks and lines
    pub fn spans(&self) -> impl Iterator<Item = &TextSpan> {
        self.lines().flat_map(|l| l.spans.iter())
    }
}

impl ContentSource for PageContent {
    fn geometry(&self) -> PageGeometry {
        self.geometry
    }

    fn paths(&self) -> &[VectorPath] {
        &self.paths
    }

    fn blocks(&self) -> &[TextBlock] {
        &self.blocks
    }
}
