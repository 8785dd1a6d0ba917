//! Open the output folder in the host file browser

use std::path::{Path, PathBuf};
use std::process::Command;

#[cfg(target_os = "windows")]
const OPENER: &str = "explorer";
#[cfg(target_os = "macos")]
const OPENER: &str = "open";
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const OPENER: &str = "xdg-open";

/// Folder holding `output`, made absolute against the working directory
pub fn output_dir(output: &Path) -> PathBuf {
    let absolute = if output.is_absolute() {
        output.to_path_buf()
    } else {
        std::env::current_dir().map(|cwd| cwd.join(output)).unwrap_or_else(|_| output.to_path_buf())
    };
    absolute
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or(absolute)
}

/// Show the folder of `output`. Failing to launch the browser is only
/// logged.
pub fn reveal(output: &Path) {
    let dir = output_dir(output);
    match Command::new(OPENER).arg(&dir).spawn() {
        Ok(_) => tracing::debug!("Opened {} with {}", dir.display(), OPENER),
        Err(e) => tracing::warn!("Could not open {} with {}: {}", dir.display(), OPENER, e),
    }
}
