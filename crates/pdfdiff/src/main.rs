//! pdfdiff CLI - overlay two PDF revisions in red and green

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pdfdiff::{reveal, resolve_paths, run, Config, FontLabel, InputResolver, PromptResolver, DEFAULT_ZOOM};

#[derive(Parser, Debug)]
#[command(name = "pdfdiff")]
#[command(about = "Overlay two PDFs, the first in red and the second in green, one output file per page")]
#[command(version)]
struct Cli {
    /// The two PDFs to compare, before then after
    #[arg(short, long, num_args = 2, value_names = ["BEFORE", "AFTER"])]
    input: Option<Vec<PathBuf>>,

    /// Output file; a page number is appended to the name
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Horizontal squeeze of redrawn text
    #[arg(short, long, visible_alias = "width_factor", default_value_t = pdfdiff::DEFAULT_WIDTH_FACTOR)]
    width_factor: f64,

    /// Do not redraw text
    #[arg(long)]
    notext: bool,

    /// Do not open the output folder when done
    #[arg(long)]
    noshow: bool,

    /// Font for redrawn text (japan, helv)
    #[arg(long, default_value = "japan")]
    font: FontLabel,

    /// Pixels per page unit for PNG output
    #[arg(long, default_value_t = DEFAULT_ZOOM)]
    zoom: f32,

    /// Number of worker threads (default: available parallelism)
    #[arg(short, long)]
    jobs: Option<usize>,
}

impl Cli {
    /// Resolved configuration; missing paths are asked for through `resolver`
    fn into_config(self, resolver: &mut dyn InputResolver) -> pdfdiff::Result<Config> {
        let input = self.input.and_then(|paths| match <[PathBuf; 2]>::try_from(paths) {
            Ok([before, after]) => Some((before, after)),
            Err(_) => None,
        });
        let (before, after, output) = resolve_paths(input, self.output, resolver)?;
        let config = Config {
            width_factor: self.width_factor,
            no_text: self.notext,
            no_show: self.noshow,
            font: self.font,
            zoom: self.zoom,
            jobs: self.jobs,
            ..Config::new(before, after, output)
        };
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli
        .into_config(&mut PromptResolver::stdio())
        .context("invalid arguments")?;

    let report = run(&config).with_context(|| format!("cannot compare {}", config.before.display()))?;
    tracing::info!("Wrote {} of {} pages", report.written.len(), report.page_count());

    if !config.no_show && !report.written.is_empty() {
        reveal(&config.output);
    }

    if !report.is_success() {
        for failure in &report.failures {
            eprintln!("page {}: {}", failure.index + 1, failure.error);
        }
        bail!("{} of {} pages failed", report.failures.len(), report.page_count());
    }
    Ok(())
}
