//! Path normalization utilities.
//!
//! - `normalize_path`: file system paths (canonicalize + fallback)
//! - `to_slash`: relative paths as forward-slash strings
//! - `with_min_suffix`: `app.css` → `app.min.css`

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - Return as-is if already absolute
/// - Join with current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Render a relative path with `/` separators regardless of platform.
///
/// Glob matching and sorting work on this form so ordering is stable.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Insert `.min` before the final extension.
///
/// ```ignore
/// assert_eq!(with_min_suffix(Path::new("a/app.css")), PathBuf::from("a/app.min.css"));
/// ```
pub fn with_min_suffix(path: &Path) -> PathBuf {
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}.min.{}", ext.to_string_lossy()),
        None => format!("{stem}.min"),
    };
    path.with_file_name(name)
}

/// Whether a file name marks a Sass partial (`_name.scss`).
pub fn is_partial(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('_'))
}
