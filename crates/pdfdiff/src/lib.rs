//! pdfdiff
//!
//! Overlays two revisions of a PDF page by page: the "before" document in
//! red, the "after" document in green. Every page becomes its own output
//! file named `{stem}-{page:03}{.ext}`.
//!
//! - `config` holds the resolved, immutable run settings
//! - `resolve` fills in missing paths interactively
//! - `job` composes and persists a single page
//! - `dispatch` runs the page jobs on a worker pool

pub mod config;
pub mod dispatch;
pub mod job;
pub mod naming;
pub mod resolve;
pub mod reveal;

pub use config::{Config, OutputFormat, DEFAULT_ZOOM};
pub use dispatch::{dispatch, run, worker_count, PageFailure, RunReport};
pub use job::compare_page;
pub use naming::page_output_path;
pub use resolve::{resolve_paths, InputResolver, PromptResolver};
pub use reveal::reveal;

pub use pdfdiff_render::{FontLabel, DEFAULT_WIDTH_FACTOR};

/// Overlay run error
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Content(#[from] pdfdiff_content::ContentError),

    #[error(transparent)]
    Render(#[from] pdfdiff_render::RenderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Job for page {index} did not complete")]
    Incomplete { index: usize },
}

impl OverlayError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        OverlayError::InvalidArgument(message.into())
    }
}

pub type Result<T> = std::result::Result<T, OverlayError>;
