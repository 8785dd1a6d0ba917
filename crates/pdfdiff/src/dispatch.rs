//! Page job dispatch
//!
//! Page indices are handed out through a shared atomic counter to a fixed
//! set of scoped worker threads. Each job owns everything it touches, so
//! pages finish in any order and a failing page leaves its siblings alone.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;

use pdfdiff_content::PdfDocument;

use crate::{compare_page, Config, OverlayError, Result};

/// A page that produced no output
#[derive(Debug)]
pub struct PageFailure {
    /// 0-based page index
    pub index: usize,
    pub error: OverlayError,
}

/// Outcome of a whole run
#[derive(Debug, Default)]
pub struct RunReport {
    /// Written files, in page order
    pub written: Vec<PathBuf>,
    /// Failed pages, in page order
    pub failures: Vec<PageFailure>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn page_count(&self) -> usize {
        self.written.len() + self.failures.len()
    }
}

/// Workers for `pages` pages: `requested`, else the available parallelism,
/// never more than there are pages and never less than one.
pub fn worker_count(pages: usize, requested: Option<usize>) -> usize {
    let threads = requested.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(4)
    });
    threads.min(pages).max(1)
}

/// Run `job` for every index in `0..count` on `workers` threads.
///
/// Slot `i` of the result holds the outcome of index `i`, or `None` when
/// that job panicked. A panic is contained to its own index; the worker
/// goes on to claim the next one.
pub fn dispatch<T, E, F>(count: usize, workers: usize, job: F) -> Vec<Option<std::result::Result<T, E>>>
where
    T: Send,
    E: Send,
    F: Fn(usize) -> std::result::Result<T, E> + Sync,
{
    let mut slots: Vec<Option<std::result::Result<T, E>>> = (0..count).map(|_| None).collect();
    if count == 0 {
        return slots;
    }

    let next = AtomicUsize::new(0);
    let (sender, receiver) = mpsc::channel();
    let job = &job;
    let next = &next;

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..workers.clamp(1, count))
            .map(|_| {
                let sender = sender.clone();
                s.spawn(move || loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    if index >= count {
                        break;
                    }
                    match panic::catch_unwind(AssertUnwindSafe(|| job(index))) {
                        Ok(outcome) => {
                            if sender.send((index, outcome)).is_err() {
                                break;
                            }
                        }
                        Err(_) => tracing::error!("Page job {} panicked", index + 1),
                    }
                })
            })
            .collect();

        for handle in handles {
            if handle.join().is_err() {
                tracing::error!("Page worker panicked");
            }
        }
    });
    drop(sender);

    for (index, outcome) in receiver {
        slots[index] = Some(outcome);
    }
    slots
}

/// Overlay every page of `config.before` with the same page of
/// `config.after`.
///
/// Validation and the page count come first; an error there means no
/// page job was started.
pub fn run(config: &Config) -> Result<RunReport> {
    config.validate()?;
    let pages = PdfDocument::open(&config.before)?.page_count();
    let workers = worker_count(pages, config.jobs);
    tracing::debug!("Dispatching {} pages to {} workers", pages, workers);

    let outcomes = dispatch(pages, workers, |index| compare_page(config, index));

    let mut report = RunReport::default();
    for (index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Some(Ok(path)) => report.written.push(path),
            Some(Err(error)) => {
                tracing::error!("Page {} failed: {}", index + 1, error);
                report.failures.push(PageFailure { index, error });
            }
            None => report.failures.push(PageFailure {
                index,
                error: OverlayError::Incomplete { index },
            }),
        }
    }
    Ok(report)
}
