//! PDF output
//!
//! Writes an [`OutputPage`] as a single-page document. Every display item
//! is wrapped in its own `q … Q` pair; opacities go through `ExtGState`
//! resources shared between items with the same (stroke, fill) pair.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use pdfdiff_geom::{Matrix, Point};

use crate::{Color, DisplayItem, FontLabel, OutputPage, Result, Segment, StyledPath, TextRun};

const PDF_VERSION: &str = "1.7";

/// Build the document for `page`
pub fn to_document(page: &OutputPage) -> Result<Document> {
    let mut doc = Document::with_version(PDF_VERSION);
    let pages_id = doc.new_object_id();

    let mut writer = ContentWriter::new(page.height());
    for item in page.items() {
        match item {
            DisplayItem::Path(path) => writer.path(path),
            DisplayItem::Text(run) => writer.text(run),
        }
    }

    let resources = writer.resources(&mut doc);
    let content = Content {
        operations: writer.operations,
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), real(page.width()), real(page.height())],
        "Contents" => content_id,
        "Resources" => resources,
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();
    Ok(doc)
}

/// Write `page` to `path` as PDF
pub fn write_pdf(page: &OutputPage, path: &Path) -> Result<()> {
    let mut doc = to_document(page)?;
    doc.save(path)?;
    tracing::debug!("Wrote {} items to {}", page.items().len(), path.display());
    Ok(())
}

fn real(value: f64) -> Object {
    Object::Real(value as _)
}

fn op(operator: &str, operands: Vec<Object>) -> Operation {
    Operation::new(operator, operands)
}

/// Opacity pair key, in thousandths so it can be ordered and hashed
type OpacityKey = (u32, u32);

/// Collects content operations and the resources they reference
struct ContentWriter {
    page_height: f64,
    operations: Vec<Operation>,
    opacities: BTreeMap<OpacityKey, String>,
    fonts: BTreeSet<FontLabel>,
}

impl ContentWriter {
    fn new(page_height: f64) -> Self {
        Self {
            page_height,
            operations: Vec::new(),
            opacities: BTreeMap::new(),
            fonts: BTreeSet::new(),
        }
    }

    /// Page space (y down) → PDF user space (y up)
    fn point(&self, p: Point) -> [Object; 2] {
        [real(p.x), real(self.page_height - p.y)]
    }

    fn gs_name(&mut self, stroke: f64, fill: f64) -> String {
        let key = ((stroke * 1000.0).round() as u32, (fill * 1000.0).round() as u32);
        let next = self.opacities.len();
        self.opacities.entry(key).or_insert_with(|| format!("GS{next}")).clone()
    }

    fn color(&mut self, operator: &str, color: Color) {
        let operands = [color.r, color.g, color.b].map(|c| real(c as f64)).to_vec();
        self.operations.push(op(operator, operands));
    }

    fn path(&mut self, path: &StyledPath) {
        let state = &path.state;
        let stroke = state.has_stroke();
        let fill = state.has_fill();

        self.operations.push(op("q", vec![]));
        let gs = self.gs_name(state.stroke_opacity, state.fill_opacity);
        self.operations.push(op("gs", vec![Object::Name(gs.into_bytes())]));
        if stroke {
            self.color("RG", state.stroke);
            self.operations.push(op("w", vec![real(state.width)]));
            self.operations.push(op("J", vec![(state.line_cap as i64).into()]));
            self.operations.push(op("j", vec![(state.line_join as i64).into()]));
            if let Some(dashes) = &state.dashes {
                let array = dashes.array.iter().map(|v| real(*v)).collect::<Vec<_>>();
                self.operations.push(op("d", vec![Object::Array(array), real(dashes.phase)]));
            }
        }
        if let Some(color) = state.fill {
            self.color("rg", color);
        }

        for segment in &path.segments {
            let operation = match *segment {
                Segment::MoveTo(p) => op("m", self.point(p).to_vec()),
                Segment::LineTo(p) => op("l", self.point(p).to_vec()),
                Segment::CurveTo(c1, c2, p) => {
                    let mut operands = self.point(c1).to_vec();
                    operands.extend(self.point(c2));
                    operands.extend(self.point(p));
                    op("c", operands)
                }
                Segment::Rect(r) => op(
                    "re",
                    vec![real(r.x0), real(self.page_height - r.y1), real(r.width()), real(r.height())],
                ),
                Segment::Close => op("h", vec![]),
            };
            self.operations.push(operation);
        }

        let paint = match (fill, stroke, state.even_odd) {
            (true, true, false) => "B",
            (true, true, true) => "B*",
            (true, false, false) => "f",
            (true, false, true) => "f*",
            (false, true, _) => "S",
            (false, false, _) => "n",
        };
        self.operations.push(op(paint, vec![]));
        self.operations.push(op("Q", vec![]));
    }

    fn text(&mut self, run: &TextRun) {
        self.fonts.insert(run.font);
        // glyph space (y up) → page space (y down) → PDF space (y up)
        let m = Matrix::scale(1.0, -1.0)
            .then(&run.placement())
            .then(&Matrix::new(1.0, 0.0, 0.0, -1.0, 0.0, self.page_height));

        self.operations.push(op("q", vec![]));
        let gs = self.gs_name(run.stroke_opacity, run.fill_opacity);
        self.operations.push(op("gs", vec![Object::Name(gs.into_bytes())]));
        self.operations.push(op("BT", vec![]));
        self.operations.push(op(
            "Tf",
            vec![Object::Name(run.font.as_str().as_bytes().to_vec()), real(run.size)],
        ));
        self.operations.push(op("Tm", [m.a, m.b, m.c, m.d, m.e, m.f].map(real).to_vec()));
        self.color("rg", run.color);
        self.color("RG", run.color);
        self.operations.push(op("Tr", vec![0.into()]));
        self.operations.push(op("Tj", vec![encode_text(run.font, &run.text)]));
        self.operations.push(op("ET", vec![]));
        self.operations.push(op("Q", vec![]));
    }

    fn resources(&self, doc: &mut Document) -> Dictionary {
        let mut states = Dictionary::new();
        for ((stroke, fill), name) in &self.opacities {
            states.set(
                name.as_bytes().to_vec(),
                dictionary! {
                    "Type" => "ExtGState",
                    "CA" => real(*stroke as f64 / 1000.0),
                    "ca" => real(*fill as f64 / 1000.0),
                },
            );
        }

        let mut fonts = Dictionary::new();
        for label in &self.fonts {
            let id = font_object(doc, *label);
            fonts.set(label.as_str().as_bytes().to_vec(), id);
        }

        dictionary! {
            "ExtGState" => states,
            "Font" => fonts,
        }
    }
}

/// Font resource object for `label`
fn font_object(doc: &mut Document, label: FontLabel) -> ObjectId {
    match label {
        FontLabel::Helv => doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        }),
        FontLabel::Japan => {
            let descriptor = doc.add_object(dictionary! {
                "Type" => "FontDescriptor",
                "FontName" => "HeiseiMin-W3",
                "Flags" => 6,
                "FontBBox" => vec![(-123).into(), (-257).into(), 1001.into(), 910.into()],
                "ItalicAngle" => 0,
                "Ascent" => 723,
                "Descent" => -241,
                "CapHeight" => 709,
                "StemV" => 69,
            });
            let descendant = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "CIDFontType0",
                "BaseFont" => "HeiseiMin-W3",
                "CIDSystemInfo" => dictionary! {
                    "Registry" => Object::string_literal("Adobe"),
                    "Ordering" => Object::string_literal("Japan1"),
                    "Supplement" => 2,
                },
                "FontDescriptor" => descriptor,
                "DW" => 1000,
            });
            doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type0",
                "BaseFont" => "HeiseiMin-W3",
                "Encoding" => "UniJIS-UCS2-H",
                "DescendantFonts" => vec![descendant.into()],
            })
        }
    }
}

/// Encode `text` for the font's encoding
fn encode_text(font: FontLabel, text: &str) -> Object {
    match font {
        FontLabel::Helv => Object::String(text.chars().map(win_ansi).collect(), StringFormat::Literal),
        FontLabel::Japan => {
            let bytes = text
                .chars()
                .flat_map(|c| {
                    let unit = u16::try_from(u32::from(c)).unwrap_or(u16::from(b'?'));
                    unit.to_be_bytes()
                })
                .collect();
            Object::String(bytes, StringFormat::Hexadecimal)
        }
    }
}

/// WinAnsiEncoding byte for `c`, `?` when unmapped
fn win_ansi(c: char) -> u8 {
    match c {
        '\u{20ac}' => 0x80,
        '\u{2026}' => 0x85,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{2122}' => 0x99,
        c if (c as u32) < 0x80 || (0xa0..=0xff).contains(&(c as u32)) => c as u8,
        _ => b'?',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_win_ansi() {
        assert_eq!(win_ansi('A'), b'A');
        assert_eq!(win_ansi('\u{e9}'), 0xe9);
        assert_eq!(win_ansi('\u{2014}'), 0x97);
        assert_eq!(win_ansi('\u{3042}'), b'?');
        assert_eq!(win_ansi('\u{85}'), b'?');
    }

    #[test]
    fn test_ucs2_encoding() {
        match encode_text(FontLabel::Japan, "A\u{3042}\u{1f600}") {
            Object::String(bytes, StringFormat::Hexadecimal) => {
                assert_eq!(bytes, vec![0x00, 0x41, 0x30, 0x42, 0x00, 0x3f]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_opacity_states_are_shared() {
        let mut writer = ContentWriter::new(100.0);
        assert_eq!(writer.gs_name(0.5, 0.1), "GS0");
        assert_eq!(writer.gs_name(0.5, 0.5), "GS1");
        assert_eq!(writer.gs_name(0.5, 0.1), "GS0");
        assert_eq!(writer.opacities.len(), 2);
    }

    #[test]
    fn test_point_flips_y() {
        let writer = ContentWriter::new(100.0);
        let [x, y] = writer.point(Point::new(10.0, 30.0));
        assert_eq!(number(&x), 10.0);
        assert_eq!(number(&y), 70.0);
    }

    fn number(obj: &Object) -> f64 {
        match obj {
            Object::Real(v) => *v as f64,
            Object::Integer(v) => *v as f64,
            other => panic!("unexpected {other:?}"),
        }
    }
}
