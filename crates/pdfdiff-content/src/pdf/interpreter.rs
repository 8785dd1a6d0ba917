//! Content stream interpreter
//!
//! Walks the operators of a page (and the form XObjects it draws) keeping
//! the graphics state needed to place paths and text in page space.

use std::collections::HashMap;
use std::rc::Rc;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};
use pdfdiff_geom::{Matrix, Point, Quad, Rect};

use super::font::FontInfo;
use super::objects::{get, get_dict, invalid, matrix_from, name, number, numbers, operand, operand_matrix};
use super::MAX_FORM_DEPTH;
use crate::{DashPattern, DrawCommand, Result, TextBlock, TextLine, TextSpan, VectorPath};

/// Two baseline directions closer than this share a line
const SAME_DIRECTION: f64 = 1e-3;

/// Operators allowed between path construction and painting.
///
/// Strictly only clipping is legal there, but producers routinely set
/// colors and stroke parameters in that position.
const TOLERATED_IN_PATH: &[&str] = &[
    "W", "W*", "w", "J", "j", "M", "d", "ri", "i", "gs", "CS", "cs", "SC", "SCN", "sc", "scn", "G",
    "g", "RG", "rg", "K", "k",
];

#[derive(Debug, Clone)]
struct TextState {
    font: Option<Rc<FontInfo>>,
    size: f64,
    char_spacing: f64,
    word_spacing: f64,
    horizontal_scaling: f64,
    leading: f64,
    rise: f64,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: None,
            size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    line_width: f64,
    line_cap: u8,
    line_join: u8,
    dashes: Option<DashPattern>,
    text: TextState,
}

impl GraphicsState {
    fn new(ctm: Matrix) -> Self {
        Self {
            ctm,
            line_width: 1.0,
            line_cap: 0,
            line_join: 0,
            dashes: None,
            text: TextState::default(),
        }
    }
}

/// Path under construction, already in page space
#[derive(Debug, Default)]
struct PathState {
    commands: Vec<DrawCommand>,
    start: Option<Point>,
    current: Option<Point>,
    closed: bool,
}

impl PathState {
    fn is_active(&self) -> bool {
        !self.commands.is_empty() || self.current.is_some()
    }

    fn move_to(&mut self, p: Point) {
        self.start = Some(p);
        self.current = Some(p);
    }

    fn line_to(&mut self, p: Point) {
        if let Some(from) = self.current {
            self.commands.push(DrawCommand::Line(from, p));
        } else {
            self.start = Some(p);
        }
        self.current = Some(p);
    }

    fn curve_to(&mut self, c1: Point, c2: Point, p: Point) {
        let from = self.current.unwrap_or(c1);
        self.commands.push(DrawCommand::Curve(from, c1, c2, p));
        self.current = Some(p);
    }

    fn close(&mut self) {
        self.closed = true;
        self.current = self.start;
    }

    fn take(&mut self) -> PathState {
        std::mem::take(self)
    }
}

/// Text object state between `BT` and `ET`
#[derive(Debug, Default)]
struct TextObject {
    tm: Matrix,
    tlm: Matrix,
    block: TextBlock,
    line: Option<TextLine>,
}

impl TextObject {
    fn set_line_matrix(&mut self, m: Matrix) {
        self.tlm = m;
        self.tm = m;
        self.break_line();
    }

    fn break_line(&mut self) {
        if let Some(line) = self.line.take() {
            if !line.spans.is_empty() {
                self.block.lines.push(line);
            }
        }
    }

    fn push_span(&mut self, dir: Point, span: TextSpan) {
        let same_line = self.line.as_ref().is_some_and(|line| {
            (line.dir.x - dir.x).abs() < SAME_DIRECTION && (line.dir.y - dir.y).abs() < SAME_DIRECTION
        });
        if !same_line {
            self.break_line();
            self.line = Some(TextLine { dir, spans: Vec::new() });
        }
        if let Some(line) = self.line.as_mut() {
            line.spans.push(span);
        }
    }

    fn finish(mut self) -> TextBlock {
        self.break_line();
        self.block
    }
}

/// Per content-stream state
struct StreamState {
    gs: GraphicsState,
    stack: Vec<GraphicsState>,
    path: PathState,
    text: Option<TextObject>,
}

/// Collects paths and text blocks from content streams
pub(crate) struct Interpreter<'a> {
    doc: &'a Document,
    /// Default user space → top-left-origin page space
    page_matrix: Matrix,
    fonts: HashMap<ObjectId, Rc<FontInfo>>,
    pub(crate) paths: Vec<VectorPath>,
    pub(crate) blocks: Vec<TextBlock>,
}

impl<'a> Interpreter<'a> {
    pub(crate) fn new(doc: &'a Document, page_box: Rect) -> Self {
        Self {
            doc,
            page_matrix: Matrix::new(1.0, 0.0, 0.0, -1.0, -page_box.x0, page_box.y1),
            fonts: HashMap::new(),
            paths: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Interpret a page content stream
    pub(crate) fn run_page(&mut self, content: &[u8], resources: Option<&'a Dictionary>) -> Result<()> {
        self.run(content, resources, Matrix::identity(), 0)
    }

    fn run(&mut self, content: &[u8], resources: Option<&'a Dictionary>, ctm: Matrix, depth: usize) -> Result<()> {
        let content = Content::decode(content)?;
        let mut st = StreamState {
            gs: GraphicsState::new(ctm),
            stack: Vec::new(),
            path: PathState::default(),
            text: None,
        };

        for op in &content.operations {
            self.execute(op, &mut st, resources, depth)?;
        }

        if st.path.is_active() {
            tracing::debug!("Dropping unpainted path at end of stream");
        }
        if let Some(text) = st.text.take() {
            self.push_block(text.finish());
        }
        Ok(())
    }

    fn execute(
        &mut self,
        op: &Operation,
        st: &mut StreamState,
        resources: Option<&'a Dictionary>,
        depth: usize,
    ) -> Result<()> {
        let operator = op.operator.as_str();
        if st.path.is_active() && !is_path_operator(operator) && !TOLERATED_IN_PATH.contains(&operator) {
            st.path.commands.push(DrawCommand::Unsupported {
                operator: operator.to_string(),
            });
        }

        match operator {
            // graphics state
            "q" => st.stack.push(st.gs.clone()),
            "Q" => match st.stack.pop() {
                Some(gs) => st.gs = gs,
                None => tracing::warn!("Unbalanced Q operator ignored"),
            },
            "cm" => st.gs.ctm = operand_matrix(op)?.then(&st.gs.ctm),
            "w" => st.gs.line_width = operand(op, 0)?,
            "J" => st.gs.line_cap = style_code(operand(op, 0)?),
            "j" => st.gs.line_join = style_code(operand(op, 0)?),
            "d" => {
                let array = op.operands.first().ok_or_else(|| invalid(op, 0))?;
                st.gs.dashes = dash_pattern(self.doc, array, operand(op, 1).unwrap_or(0.0));
            }
            "gs" => self.apply_ext_gstate(op, st, resources),

            // path construction
            "m" => {
                let p = self.user_point(st, operand(op, 0)?, operand(op, 1)?);
                st.path.move_to(p);
            }
            "l" => {
                let p = self.user_point(st, operand(op, 0)?, operand(op, 1)?);
                st.path.line_to(p);
            }
            "c" => {
                let c1 = self.user_point(st, operand(op, 0)?, operand(op, 1)?);
                let c2 = self.user_point(st, operand(op, 2)?, operand(op, 3)?);
                let p = self.user_point(st, operand(op, 4)?, operand(op, 5)?);
                st.path.curve_to(c1, c2, p);
            }
            "v" => {
                let c2 = self.user_point(st, operand(op, 0)?, operand(op, 1)?);
                let p = self.user_point(st, operand(op, 2)?, operand(op, 3)?);
                let c1 = st.path.current.unwrap_or(c2);
                st.path.curve_to(c1, c2, p);
            }
            "y" => {
                let c1 = self.user_point(st, operand(op, 0)?, operand(op, 1)?);
                let p = self.user_point(st, operand(op, 2)?, operand(op, 3)?);
                st.path.curve_to(c1, p, p);
            }
            "h" => st.path.close(),
            "re" => {
                let (x, y) = (operand(op, 0)?, operand(op, 1)?);
                let (w, h) = (operand(op, 2)?, operand(op, 3)?);
                let command = self.rectangle(st, x, y, w, h);
                st.path.commands.push(command);
                let origin = self.user_point(st, x, y);
                st.path.move_to(origin);
            }

            // path painting
            "S" => self.paint(st, false, true, false),
            "s" => {
                st.path.close();
                self.paint(st, false, true, false);
            }
            "f" | "F" => self.paint(st, true, false, false),
            "f*" => self.paint(st, true, false, true),
            "B" => self.paint(st, true, true, false),
            "B*" => self.paint(st, true, true, true),
            "b" => {
                st.path.close();
                self.paint(st, true, true, false);
            }
            "b*" => {
                st.path.close();
                self.paint(st, true, true, true);
            }
            "n" => {
                st.path.take();
            }
            "W" | "W*" => {}

            // text objects
            "BT" => {
                if let Some(previous) = st.text.take() {
                    self.push_block(previous.finish());
                }
                st.text = Some(TextObject::default());
            }
            "ET" => {
                if let Some(text) = st.text.take() {
                    self.push_block(text.finish());
                }
            }
            "Tf" => {
                let font_name = op.operands.first().and_then(name).ok_or_else(|| invalid(op, 0))?;
                st.gs.text.font = Some(self.font(resources, font_name));
                st.gs.text.size = operand(op, 1)?;
            }
            "Tc" => st.gs.text.char_spacing = operand(op, 0)?,
            "Tw" => st.gs.text.word_spacing = operand(op, 0)?,
            "Tz" => st.gs.text.horizontal_scaling = operand(op, 0)? / 100.0,
            "TL" => st.gs.text.leading = operand(op, 0)?,
            "Ts" => st.gs.text.rise = operand(op, 0)?,
            "Td" => self.move_text(st, operand(op, 0)?, operand(op, 1)?),
            "TD" => {
                let (tx, ty) = (operand(op, 0)?, operand(op, 1)?);
                st.gs.text.leading = -ty;
                self.move_text(st, tx, ty);
            }
            "Tm" => {
                let m = operand_matrix(op)?;
                if let Some(text) = st.text.as_mut() {
                    text.set_line_matrix(m);
                }
            }
            "T*" => self.next_line(st),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    self.show(st, &[TextPiece::Text(bytes)]);
                }
            }
            "'" => {
                self.next_line(st);
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    self.show(st, &[TextPiece::Text(bytes)]);
                }
            }
            "\"" => {
                st.gs.text.word_spacing = operand(op, 0)?;
                st.gs.text.char_spacing = operand(op, 1)?;
                self.next_line(st);
                if let Some(Object::String(bytes, _)) = op.operands.get(2) {
                    self.show(st, &[TextPiece::Text(bytes)]);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = op.operands.first() {
                    let pieces: Vec<TextPiece> = items
                        .iter()
                        .filter_map(|item| match item {
                            Object::String(bytes, _) => Some(TextPiece::Text(bytes)),
                            other => number(other).map(TextPiece::Kern),
                        })
                        .collect();
                    self.show(st, &pieces);
                }
            }

            // external objects
            "Do" => self.draw_xobject(op, st, resources, depth)?,

            _ => {}
        }
        Ok(())
    }

    /// User space point → page space
    fn user_point(&self, st: &StreamState, x: f64, y: f64) -> Point {
        st.gs.ctm.then(&self.page_matrix).transform_point(Point::new(x, y))
    }

    fn rectangle(&self, st: &StreamState, x: f64, y: f64, w: f64, h: f64) -> DrawCommand {
        let to_page = st.gs.ctm.then(&self.page_matrix);
        let corner = |cx: f64, cy: f64| to_page.transform_point(Point::new(cx, cy));
        if to_page.is_rectilinear() {
            DrawCommand::Rect(Rect::bounding(&[corner(x, y), corner(x + w, y + h)]))
        } else {
            DrawCommand::Quad(Quad::new(
                corner(x, y + h),
                corner(x + w, y + h),
                corner(x, y),
                corner(x + w, y),
            ))
        }
    }

    fn paint(&mut self, st: &mut StreamState, fill: bool, stroke: bool, even_odd: bool) {
        let path = st.path.take();
        if path.commands.is_empty() {
            return;
        }
        let gs = &st.gs;
        self.paths.push(VectorPath {
            commands: path.commands,
            fill,
            dashes: if stroke { gs.dashes.clone() } else { None },
            even_odd: fill.then_some(even_odd),
            close_path: path.closed,
            line_join: stroke.then_some(gs.line_join),
            line_caps: stroke.then(|| vec![gs.line_cap; 3]),
            width: stroke.then(|| gs.line_width * gs.ctm.expansion()),
        });
    }

    fn apply_ext_gstate(&self, op: &Operation, st: &mut StreamState, resources: Option<&'a Dictionary>) {
        let doc = self.doc;
        let state = resources
            .and_then(|r| get_dict(doc, r, b"ExtGState"))
            .zip(op.operands.first().and_then(name))
            .and_then(|(states, key)| get_dict(doc, states, key));
        let Some(state) = state else {
            tracing::debug!("Unknown ExtGState in {:?}", op.operands);
            return;
        };

        if let Some(w) = get(doc, state, b"LW").and_then(number) {
            st.gs.line_width = w;
        }
        if let Some(cap) = get(doc, state, b"LC").and_then(number) {
            st.gs.line_cap = style_code(cap);
        }
        if let Some(join) = get(doc, state, b"LJ").and_then(number) {
            st.gs.line_join = style_code(join);
        }
        if let Some(Object::Array(d)) = get(doc, state, b"D") {
            if let (Some(array), Some(phase)) = (d.first(), d.get(1).and_then(number)) {
                st.gs.dashes = dash_pattern(doc, array, phase);
            }
        }
    }

    fn font(&mut self, resources: Option<&'a Dictionary>, font_name: &[u8]) -> Rc<FontInfo> {
        let doc = self.doc;
        let Some(fonts) = resources.and_then(|r| get_dict(doc, r, b"Font")) else {
            return Rc::new(FontInfo::fallback());
        };
        let id = match fonts.get(font_name) {
            Ok(Object::Reference(id)) => Some(*id),
            _ => None,
        };
        if let Some(cached) = id.and_then(|id| self.fonts.get(&id)) {
            return Rc::clone(cached);
        }

        let info = match get_dict(doc, fonts, font_name) {
            Some(dict) => Rc::new(FontInfo::load(doc, dict)),
            None => {
                tracing::debug!("Font {} not found in resources", String::from_utf8_lossy(font_name));
                Rc::new(FontInfo::fallback())
            }
        };
        if let Some(id) = id {
            self.fonts.insert(id, Rc::clone(&info));
        }
        info
    }

    fn move_text(&self, st: &mut StreamState, tx: f64, ty: f64) {
        if let Some(text) = st.text.as_mut() {
            let m = Matrix::translate(tx, ty).then(&text.tlm);
            text.set_line_matrix(m);
        }
    }

    fn next_line(&self, st: &mut StreamState) {
        let leading = st.gs.text.leading;
        self.move_text(st, 0.0, -leading);
    }

    /// Show text pieces as one span, advancing the text matrix
    fn show(&self, st: &mut StreamState, pieces: &[TextPiece<'_>]) {
        let Some(text) = st.text.as_mut() else {
            tracing::debug!("Text shown outside BT/ET ignored");
            return;
        };
        let ts = &st.gs.text;
        let fallback;
        let font: &FontInfo = match &ts.font {
            Some(font) => font,
            None => {
                fallback = FontInfo::fallback();
                &fallback
            }
        };

        let to_page = text.tm.then(&st.gs.ctm).then(&self.page_matrix);
        let origin = to_page.transform_point(Point::new(0.0, ts.rise));
        let dir = to_page.transform_vector(Point::new(1.0, 0.0)).unit();
        let size = ts.size.abs() * to_page.transform_vector(Point::new(0.0, 1.0)).length();

        let mut content = String::new();
        for piece in pieces {
            match piece {
                TextPiece::Text(bytes) => {
                    for code in font.codes(bytes) {
                        font.decode(code, &mut content);
                        let mut advance = font.width(code) / 1000.0 * ts.size + ts.char_spacing;
                        if font.is_word_space(code) {
                            advance += ts.word_spacing;
                        }
                        text.tm = Matrix::translate(advance * ts.horizontal_scaling, 0.0).then(&text.tm);
                    }
                }
                TextPiece::Kern(amount) => {
                    let advance = -amount / 1000.0 * ts.size * ts.horizontal_scaling;
                    text.tm = Matrix::translate(advance, 0.0).then(&text.tm);
                }
            }
        }

        let Some(dir) = dir else {
            tracing::debug!("Degenerate text matrix, span skipped");
            return;
        };
        if content.is_empty() {
            return;
        }
        text.push_span(dir, TextSpan { origin, text: content, size });
    }

    fn draw_xobject(
        &mut self,
        op: &Operation,
        st: &mut StreamState,
        resources: Option<&'a Dictionary>,
        depth: usize,
    ) -> Result<()> {
        let doc = self.doc;
        let key = op.operands.first().and_then(name).ok_or_else(|| invalid(op, 0))?;
        let stream = resources
            .and_then(|r| get_dict(doc, r, b"XObject"))
            .and_then(|xobjects| get(doc, xobjects, key));
        let Some(Object::Stream(stream)) = stream else {
            tracing::debug!("XObject {} not found", String::from_utf8_lossy(key));
            return Ok(());
        };
        if get(doc, &stream.dict, b"Subtype").and_then(name) != Some(b"Form".as_slice()) {
            return Ok(());
        }
        if depth >= MAX_FORM_DEPTH {
            tracing::warn!("Form XObjects nested deeper than {} levels skipped", MAX_FORM_DEPTH);
            return Ok(());
        }

        let form_matrix = get(doc, &stream.dict, b"Matrix")
            .and_then(|m| matrix_from(doc, m))
            .unwrap_or_default();
        let form_resources = get_dict(doc, &stream.dict, b"Resources").or(resources);
        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());

        self.run(&data, form_resources, form_matrix.then(&st.gs.ctm), depth + 1)
    }

    fn push_block(&mut self, block: TextBlock) {
        if !block.lines.is_empty() {
            self.blocks.push(block);
        }
    }
}

enum TextPiece<'b> {
    Text(&'b [u8]),
    Kern(f64),
}

fn is_path_operator(operator: &str) -> bool {
    matches!(
        operator,
        "m" | "l" | "c" | "v" | "y" | "h" | "re" | "S" | "s" | "f" | "F" | "f*" | "B" | "B*" | "b" | "b*" | "n"
    )
}

/// Cap/join code clamped to the defined styles 0..=2
fn style_code(value: f64) -> u8 {
    value.clamp(0.0, 2.0) as u8
}

fn dash_pattern(doc: &Document, array: &Object, phase: f64) -> Option<DashPattern> {
    let array = numbers(doc, array)?;
    let pattern = DashPattern { array, phase };
    (!pattern.is_solid()).then_some(pattern)
}
