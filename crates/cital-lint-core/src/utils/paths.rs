//! Path utilities for folder-convention checks.

use std::path::Path;

/// Converts a path to a string with `/` separators.
///
/// # Example
///
/// ```ignore
/// assert_eq!(normalize_separators(Path::new(r"C:\src\App\Foo.al")), "C:/src/App/Foo.al");
/// ```
#[must_use]
pub fn normalize_separators(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Splits a normalized path into its non-empty segments.
#[must_use]
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Index of the first segment in `start..end` equal to `needle`, ignoring case.
#[must_use]
pub fn position_ignore_case(parts: &[&str], needle: &str, start: usize, end: usize) -> Option<usize> {
    let end = end.min(parts.len());
    (start..end).find(|&i| parts[i].eq_ignore_ascii_case(needle))
}

/// File name of a path, or the whole path if it has none.
#[must_use]
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.to_string_lossy(), |n| n.to_string_lossy())
        .into_owned()
}
