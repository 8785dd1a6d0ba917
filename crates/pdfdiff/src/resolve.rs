//! Input resolution
//!
//! Paths not given on the command line are asked for through an
//! [`InputResolver`]. The overlay itself only ever sees a resolved
//! [`Config`](crate::Config).

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::{OverlayError, Result};

/// Supplies paths missing from the command line
pub trait InputResolver {
    /// Ask for an input document; `role` is "before" or "after"
    fn input(&mut self, role: &str) -> Result<PathBuf>;

    /// Ask for the output path
    fn output(&mut self) -> Result<PathBuf>;
}

/// Asks on a terminal, one line per answer
pub struct PromptResolver<R, W> {
    reader: R,
    writer: W,
}

impl PromptResolver<io::StdinLock<'static>, io::Stderr> {
    /// Read answers from stdin, prompt on stderr
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> PromptResolver<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.writer, "{prompt}: ")?;
        self.writer.flush()?;
        let mut line = String::new();
        self.reader.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead, W: Write> InputResolver for PromptResolver<R, W> {
    fn input(&mut self, role: &str) -> Result<PathBuf> {
        let answer = self.ask(&format!("{role} PDF"))?;
        if answer.is_empty() {
            return Err(OverlayError::invalid(format!("no {role} file given")));
        }
        Ok(PathBuf::from(answer))
    }

    fn output(&mut self) -> Result<PathBuf> {
        let answer = self.ask("Save overlay as")?;
        if answer.is_empty() {
            return Err(OverlayError::invalid("no output file given"));
        }
        let mut path = PathBuf::from(answer);
        if path.extension().is_none() {
            path.set_extension("pdf");
        }
        Ok(path)
    }
}

/// Fill in whatever the command line left out.
///
/// Both inputs are asked for when `input` is missing, then the output.
pub fn resolve_paths(
    input: Option<(PathBuf, PathBuf)>,
    output: Option<PathBuf>,
    resolver: &mut dyn InputResolver,
) -> Result<(PathBuf, PathBuf, PathBuf)> {
    let (before, after) = match input {
        Some(pair) => pair,
        None => {
            let before = resolver.input("before")?;
            let after = resolver.input("after")?;
            (before, after)
        }
    };
    let output = match output {
        Some(path) => path,
        None => resolver.output()?,
    };
    Ok((before, after, output))
}
