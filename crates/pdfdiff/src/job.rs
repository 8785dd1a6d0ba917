//! Single page job
//!
//! Opens its own handles to both documents, composes one overlay page and
//! writes it next to the configured output.

use std::path::PathBuf;

use pdfdiff_content::PdfDocument;
use pdfdiff_render::{compose, pdf, raster};

use crate::{page_output_path, Config, OutputFormat, Result};

/// Overlay page `index` of both documents and persist it.
///
/// Nothing is written when extraction or composition fails.
pub fn compare_page(config: &Config, index: usize) -> Result<PathBuf> {
    let format = config.format()?;
    let before = PdfDocument::open(&config.before)?.page(index)?;
    let after = PdfDocument::open(&config.after)?.page(index)?;

    let page = compose(&before, &after, &config.compose_options())?;

    let path = page_output_path(&config.output, index);
    match format {
        OutputFormat::Pdf => pdf::write_pdf(&page, &path)?,
        OutputFormat::Png => raster::save_png(&page, &path, config.zoom)?,
    }
    tracing::info!("Page {} -> {}", index + 1, path.display());
    Ok(path)
}
