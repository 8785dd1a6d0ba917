//! Extraction tests for pdfdiff-content
//!
//! Documents are assembled in memory with lopdf and run through the
//! content stream interpreter.

use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use pdfdiff_content::*;
use pdfdiff_geom::{Point, Rect};

/// Single-page document with a 200x100 media box
fn document(content: &str, resources: Dictionary, extra: Dictionary) -> PdfDocument {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.as_bytes().to_vec()));

    let mut page = dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources,
    };
    for (key, value) in extra.iter() {
        page.set(key.clone(), value.clone());
    }
    let page_id = doc.add_object(page);

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), 200.into(), 100.into()],
            "Rotate" => 90,
        }),
    );
    let catalog = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog);
    PdfDocument::from_document(doc)
}

fn page(content: &str) -> PageContent {
    document(content, dictionary! {}, dictionary! {}).page(0).unwrap()
}

fn helvetica() -> Dictionary {
    dictionary! {
        "Font" => dictionary! {
            "F1" => dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
            },
        },
    }
}

// ============================================================================
// PAGE GEOMETRY
// ============================================================================

#[test]
fn test_geometry_inherits_media_box_and_rotation() {
    let doc = document("", dictionary! {}, dictionary! {});
    assert_eq!(doc.page_count(), 1);
    let geometry = doc.geometry(0).unwrap();
    assert_eq!(geometry.width, 200.0);
    assert_eq!(geometry.height, 100.0);
    assert_eq!(geometry.rotation(), 90);
    assert_eq!(geometry.rect(), Rect::new(0.0, 0.0, 100.0, 200.0));
}

#[test]
fn test_crop_box_wins_over_media_box() {
    let extra = dictionary! {
        "CropBox" => vec![10.into(), 0.into(), 110.into(), 50.into()],
        "Rotate" => 0,
    };
    let doc = document("0 0 m 10 10 l S", dictionary! {}, extra);
    let geometry = doc.geometry(0).unwrap();
    assert_eq!((geometry.width, geometry.height), (100.0, 50.0));
    assert_eq!(geometry.rotation(), 0);

    // Origin shifts with the crop box
    let content = doc.page(0).unwrap();
    assert_eq!(
        content.paths[0].commands,
        vec![DrawCommand::Line(Point::new(-10.0, 50.0), Point::new(0.0, 40.0))]
    );
}

#[test]
fn test_page_out_of_range() {
    let doc = document("", dictionary! {}, dictionary! {});
    match doc.page(3) {
        Err(ContentError::PageOutOfRange { index, count }) => {
            assert_eq!(index, 3);
            assert_eq!(count, 1);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_empty_page() {
    let content = page("");
    assert!(content.paths.is_empty());
    assert!(content.blocks.is_empty());
}

// ============================================================================
// PATHS
// ============================================================================

#[test]
fn test_filled_rectangle() {
    let content = page("10 20 30 40 re f");
    assert_eq!(content.paths.len(), 1);
    let path = &content.paths[0];
    assert_eq!(path.commands, vec![DrawCommand::Rect(Rect::new(10.0, 40.0, 40.0, 80.0))]);
    assert!(path.fill);
    assert_eq!(path.even_odd, Some(false));
    assert_eq!(path.width, None);
    assert_eq!(path.line_join, None);
}

#[test]
fn test_stroked_line_attributes() {
    let content = page("2 w 1 J 2 j 10 10 m 50 10 l S");
    let path = &content.paths[0];
    assert_eq!(
        path.commands,
        vec![DrawCommand::Line(Point::new(10.0, 90.0), Point::new(50.0, 90.0))]
    );
    assert!(!path.fill);
    assert_eq!(path.even_odd, None);
    assert_eq!(path.width, Some(2.0));
    assert_eq!(path.line_join, Some(2));
    assert_eq!(path.line_caps, Some(vec![1, 1, 1]));
    assert!(!path.close_path);
}

#[test]
fn test_width_follows_ctm_scale() {
    let content = page("q 2 0 0 2 0 0 cm 3 w 0 0 m 10 0 l S Q");
    assert_eq!(content.paths[0].width, Some(6.0));
}

#[test]
fn test_close_and_even_odd_fill() {
    let content = page("0 0 m 10 0 l 10 10 l b*");
    let path = &content.paths[0];
    assert!(path.close_path);
    assert!(path.fill);
    assert_eq!(path.even_odd, Some(true));
    assert!(path.width.is_some());
    assert_eq!(path.commands.len(), 2);
}

#[test]
fn test_curves() {
    let content = page("0 0 m 10 0 20 10 30 30 c 40 40 50 50 v S");
    let commands = &content.paths[0].commands;
    assert_eq!(commands.len(), 2);
    assert_eq!(
        commands[0],
        DrawCommand::Curve(
            Point::new(0.0, 100.0),
            Point::new(10.0, 100.0),
            Point::new(20.0, 90.0),
            Point::new(30.0, 70.0),
        )
    );
    // `v` reuses the current point as first control point
    match commands[1] {
        DrawCommand::Curve(p0, c1, _, _) => assert_eq!(p0, c1),
        ref other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_rotated_rectangle_becomes_quad() {
    let content = page("q 0 1 -1 0 50 50 cm 0 0 10 20 re f Q");
    let commands = &content.paths[0].commands;
    assert_eq!(commands.len(), 1);
    // A quarter turn keeps the rectangle axis aligned
    assert!(matches!(commands[0], DrawCommand::Rect(_)));

    let content = page("q 0.8 0.6 -0.6 0.8 50 50 cm 0 0 10 20 re f Q");
    match content.paths[0].commands[0] {
        DrawCommand::Quad(quad) => {
            assert!((quad.ll.x - 50.0).abs() < 1e-9);
            assert!((quad.ll.y - 50.0).abs() < 1e-9);
        }
        ref other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_dash_pattern() {
    let content = page("[3 1] 0 d 0 0 m 10 0 l S [] 0 d 0 0 m 10 0 l S");
    assert_eq!(
        content.paths[0].dashes,
        Some(DashPattern { array: vec![3.0, 1.0], phase: 0.0 })
    );
    assert_eq!(content.paths[1].dashes, None);
}

#[test]
fn test_discarded_path() {
    let content = page("0 0 10 10 re W n 0 0 m 5 5 l S");
    assert_eq!(content.paths.len(), 1);
    assert_eq!(content.paths[0].commands.len(), 1);
}

#[test]
fn test_ext_gstate_line_width() {
    let resources = dictionary! {
        "ExtGState" => dictionary! {
            "GS1" => dictionary! { "Type" => "ExtGState", "LW" => 4, "LJ" => 1 },
        },
    };
    let doc = document("/GS1 gs 0 0 m 10 0 l S", resources, dictionary! {});
    let content = doc.page(0).unwrap();
    assert_eq!(content.paths[0].width, Some(4.0));
    assert_eq!(content.paths[0].line_join, Some(1));
}

#[test]
fn test_unbalanced_restore_is_ignored() {
    let content = page("Q Q 0 0 m 10 10 l S");
    assert_eq!(content.paths.len(), 1);
}

#[test]
fn test_restore_resets_ctm() {
    let content = page("q 1 0 0 1 50 0 cm Q 0 0 m 10 0 l S");
    assert_eq!(
        content.paths[0].commands,
        vec![DrawCommand::Line(Point::new(0.0, 100.0), Point::new(10.0, 100.0))]
    );
}

#[test]
fn test_text_inside_path_is_unsupported() {
    let content = page("0 0 m 10 10 l BT ET S");
    let commands = &content.paths[0].commands;
    assert!(commands
        .iter()
        .any(|c| matches!(c, DrawCommand::Unsupported { operator } if operator == "BT")));
}

#[test]
fn test_color_inside_path_is_tolerated() {
    let content = page("0 0 m 10 10 l 1 0 0 RG S");
    assert_eq!(content.paths[0].commands.len(), 1);
}

#[test]
fn test_invalid_operand() {
    let doc = document("(oops) w", dictionary! {}, dictionary! {});
    assert!(matches!(doc.page(0), Err(ContentError::InvalidOperand { .. })));
}

// ============================================================================
// FORM XOBJECTS
// ============================================================================

fn form_resources(form_content: &str) -> Dictionary {
    let form = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![0.into(), 0.into(), 50.into(), 50.into()],
            "Matrix" => vec![1.into(), 0.into(), 0.into(), 1.into(), 10.into(), 10.into()],
        },
        form_content.as_bytes().to_vec(),
    );
    dictionary! { "XObject" => dictionary! { "Fm1" => form } }
}

#[test]
fn test_form_xobject_paths() {
    let doc = document("/Fm1 Do", form_resources("0 0 5 5 re f"), dictionary! {});
    let content = doc.page(0).unwrap();
    assert_eq!(
        content.paths[0].commands,
        vec![DrawCommand::Rect(Rect::new(10.0, 85.0, 15.0, 90.0))]
    );
}

#[test]
fn test_missing_xobject_is_skipped() {
    let content = page("/Nope Do 0 0 m 1 1 l S");
    assert_eq!(content.paths.len(), 1);
}

// ============================================================================
// TEXT
// ============================================================================

#[test]
fn test_text_spans() {
    let doc = document("BT /F1 12 Tf 72 50 Td (Hi) Tj ( there) Tj ET", helvetica(), dictionary! {});
    let content = doc.page(0).unwrap();
    assert_eq!(content.blocks.len(), 1);
    let line = &content.blocks[0].lines[0];
    assert_eq!(line.dir, Point::new(1.0, 0.0));
    assert_eq!(line.spans.len(), 2);

    let first = &line.spans[0];
    assert_eq!(first.text, "Hi");
    assert_eq!(first.size, 12.0);
    assert_eq!(first.origin, Point::new(72.0, 50.0));

    // Two glyphs of the default 500 advance at 12pt
    assert_eq!(line.spans[1].origin, Point::new(84.0, 50.0));
}

#[test]
fn test_text_lines_and_leading() {
    let doc = document(
        "BT /F1 10 Tf 14 TL 10 80 Td (one) Tj T* (two) Tj ET",
        helvetica(),
        dictionary! {},
    );
    let content = doc.page(0).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].spans[0].origin, Point::new(10.0, 20.0));
    assert_eq!(lines[1].spans[0].origin, Point::new(10.0, 34.0));
}

#[test]
fn test_tj_array_kerning() {
    let doc = document("BT /F1 10 Tf 0 50 Td [(A) -1000 (B)] TJ (C) Tj ET", helvetica(), dictionary! {});
    let content = doc.page(0).unwrap();
    let spans: Vec<_> = content.spans().collect();
    assert_eq!(spans[0].text, "AB");
    // Two advances of 5 plus a kern of 10
    assert!((spans[1].origin.x - 20.0).abs() < 1e-9);
}

#[test]
fn test_text_matrix_direction_and_size() {
    let doc = document("BT /F1 1 Tf 0 12 -12 0 100 20 Tm (up) Tj ET", helvetica(), dictionary! {});
    let content = doc.page(0).unwrap();
    let line = &content.blocks[0].lines[0];
    assert!((line.dir.x).abs() < 1e-9);
    assert!((line.dir.y + 1.0).abs() < 1e-9);
    assert!((line.spans[0].size - 12.0).abs() < 1e-9);
    assert_eq!(line.spans[0].origin, Point::new(100.0, 80.0));
}

#[test]
fn test_text_without_font_uses_fallback() {
    let content = page("BT 0 50 Td (x) Tj ET");
    let spans: Vec<_> = content.spans().collect();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].text, "x");
}
