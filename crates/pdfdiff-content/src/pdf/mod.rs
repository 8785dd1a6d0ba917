//! PDF backend
//!
//! Loads a document with lopdf and interprets page content streams into
//! [`PageContent`].

mod font;
mod interpreter;
mod objects;

use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId};
use pdfdiff_geom::{PageGeometry, Rect};

use crate::{ContentError, PageContent, Result};
use interpreter::Interpreter;
use objects::{inherited, number, numbers};

/// Form XObjects nested deeper than this are not drawn
pub const MAX_FORM_DEPTH: usize = 32;

/// Loaded PDF document
pub struct PdfDocument {
    doc: Document,
    pages: Vec<ObjectId>,
}

impl PdfDocument {
    /// Load a document from disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let doc = Document::load(path.as_ref())?;
        Ok(Self::from_document(doc))
    }

    pub fn from_document(doc: Document) -> Self {
        let pages = doc.get_pages().into_values().collect();
        Self { doc, pages }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Geometry of page `index` without interpreting its content
    pub fn geometry(&self, index: usize) -> Result<PageGeometry> {
        let page = self.page_dict(index)?;
        page_geometry(&self.doc, page)
    }

    /// Extract paths and text of page `index` (0-based)
    pub fn page(&self, index: usize) -> Result<PageContent> {
        let id = self.page_id(index)?;
        let page = self.doc.get_dictionary(id)?;
        let geometry = page_geometry(&self.doc, page)?;
        let page_box = page_box(&self.doc, page)?;

        let resources = match inherited(&self.doc, page, b"Resources") {
            Some(Object::Dictionary(dict)) => Some(dict),
            _ => None,
        };
        let content = self.doc.get_page_content(id)?;

        let mut interpreter = Interpreter::new(&self.doc, page_box);
        interpreter.run_page(&content, resources)?;

        tracing::debug!(
            "Page {}: {} paths, {} text blocks",
            index + 1,
            interpreter.paths.len(),
            interpreter.blocks.len()
        );

        let mut result = PageContent::new(geometry);
        result.paths = interpreter.paths;
        result.blocks = interpreter.blocks;
        Ok(result)
    }

    fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.pages.get(index).copied().ok_or(ContentError::PageOutOfRange {
            index,
            count: self.pages.len(),
        })
    }

    fn page_dict(&self, index: usize) -> Result<&Dictionary> {
        Ok(self.doc.get_dictionary(self.page_id(index)?)?)
    }
}

/// Visible page box: the crop box when present, else the media box
fn page_box(doc: &Document, page: &Dictionary) -> Result<Rect> {
    let corners = inherited(doc, page, b"CropBox")
        .and_then(|b| numbers(doc, b))
        .filter(|b| b.len() == 4)
        .or_else(|| inherited(doc, page, b"MediaBox").and_then(|b| numbers(doc, b)))
        .ok_or(ContentError::MissingMediaBox)?;
    match corners.as_slice() {
        [x0, y0, x1, y1] => Ok(Rect::new(x0.min(*x1), y0.min(*y1), x0.max(*x1), y0.max(*y1))),
        _ => Err(ContentError::MissingMediaBox),
    }
}

fn page_geometry(doc: &Document, page: &Dictionary) -> Result<PageGeometry> {
    let rect = page_box(doc, page)?;
    let rotation = inherited(doc, page, b"Rotate").and_then(number).unwrap_or(0.0);
    Ok(PageGeometry::new(rect.width(), rect.height(), rotation as i64))
}
