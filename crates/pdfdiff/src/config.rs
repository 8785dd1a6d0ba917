//! Run configuration
//!
//! `Config` is built once, validated before any page is touched and then
//! shared read-only by every page job.

use std::path::{Path, PathBuf};

use pdfdiff_render::{ComposeOptions, FontLabel, DEFAULT_WIDTH_FACTOR};

use crate::{OverlayError, Result};

pub use pdfdiff_render::raster::DEFAULT_ZOOM;

/// Output file format, picked from the output extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Vector overlay (`.pdf` or no extension)
    Pdf,
    /// Raster preview (`.png`)
    Png,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let Some(ext) = path.extension() else {
            return Ok(OutputFormat::Pdf);
        };
        match ext.to_string_lossy().to_ascii_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "png" => Ok(OutputFormat::Png),
            other => Err(OverlayError::invalid(format!(
                "unsupported output extension '.{other}' (expected .pdf or .png)"
            ))),
        }
    }
}

/// Resolved run settings
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Document drawn in red
    pub before: PathBuf,
    /// Document drawn in green
    pub after: PathBuf,
    /// Output path; the page number is appended to its stem
    pub output: PathBuf,
    /// Horizontal squeeze of redrawn text
    pub width_factor: f64,
    pub no_text: bool,
    /// Skip opening the output folder when done
    pub no_show: bool,
    pub font: FontLabel,
    /// Pixels per page unit for PNG output
    pub zoom: f32,
    /// Worker count override
    pub jobs: Option<usize>,
}

impl Config {
    /// Settings with defaults for everything but the paths
    pub fn new(before: impl Into<PathBuf>, after: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
            output: output.into(),
            width_factor: DEFAULT_WIDTH_FACTOR,
            no_text: false,
            no_show: false,
            font: FontLabel::default(),
            zoom: DEFAULT_ZOOM,
            jobs: None,
        }
    }

    /// Check everything that can be checked without opening a document
    pub fn validate(&self) -> Result<()> {
        if self.before.as_os_str().is_empty() || self.after.as_os_str().is_empty() {
            return Err(OverlayError::invalid("input file name is empty"));
        }
        if self.output.as_os_str().is_empty() {
            return Err(OverlayError::invalid("output file name is empty"));
        }
        if self.output.file_stem().is_none() {
            return Err(OverlayError::invalid(format!(
                "output '{}' has no file name",
                self.output.display()
            )));
        }
        OutputFormat::from_path(&self.output)?;
        if !(self.width_factor.is_finite() && self.width_factor > 0.0) {
            return Err(OverlayError::invalid(format!(
                "width factor must be positive, got {}",
                self.width_factor
            )));
        }
        if !(self.zoom.is_finite() && self.zoom > 0.0) {
            return Err(OverlayError::invalid(format!("zoom must be positive, got {}", self.zoom)));
        }
        if self.jobs == Some(0) {
            return Err(OverlayError::invalid("job count must be at least 1"));
        }
        Ok(())
    }

    pub fn format(&self) -> Result<OutputFormat> {
        OutputFormat::from_path(&self.output)
    }

    pub fn compose_options(&self) -> ComposeOptions {
        ComposeOptions {
            width_factor: self.width_factor,
            draw_text: !self.no_text,
            font: self.font,
        }
    }
}
