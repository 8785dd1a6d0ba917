//! Per-page output names

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Output path for page `index` (0-based): the 1-based page number, zero
/// padded to three digits, is appended to the stem.
///
/// `out/diff.pdf` → `out/diff-001.pdf`; a missing extension stays missing.
pub fn page_output_path(output: &Path, index: usize) -> PathBuf {
    let mut name = OsString::new();
    if let Some(stem) = output.file_stem() {
        name.push(stem);
    }
    name.push(format!("-{:03}", index + 1));
    if let Some(ext) = output.extension() {
        name.push(".");
        name.push(ext);
    }
    output.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_is_one_based_and_padded() {
        let output = Path::new("out/diff.pdf");
        assert_eq!(page_output_path(output, 0), PathBuf::from("out/diff-001.pdf"));
        assert_eq!(page_output_path(output, 41), PathBuf::from("out/diff-042.pdf"));
        assert_eq!(page_output_path(output, 999), PathBuf::from("out/diff-1000.pdf"));
    }

    #[test]
    fn test_extensionless_output() {
        assert_eq!(page_output_path(Path::new("diff"), 2), PathBuf::from("diff-003"));
    }

    #[test]
    fn test_only_last_extension_moves() {
        assert_eq!(
            page_output_path(Path::new("v1.2.png"), 0),
            PathBuf::from("v1.2-001.png")
        );
    }
}
