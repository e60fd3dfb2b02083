//! Map request URLs onto files under the build root.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

use percent_encoding::percent_decode_str;

/// File to serve for `url`, or `None` for a 404.
///
/// Directories fall back to their `index.html`, and clean URLs such as
/// `/about` fall back to `about.html`. The result always lies under `root`
/// after symlinks are resolved.
pub fn resolve_path(url: &str, root: &Path) -> Option<PathBuf> {
    let rel = request_path(url)?;
    let root = root.canonicalize().ok()?;

    let target = root.join(&rel);
    let candidates = [
        target.clone(),
        target.join("index.html"),
        target.with_extension("html"),
    ];
    candidates
        .iter()
        .filter_map(|path| path.canonicalize().ok())
        .find(|path| path.starts_with(&root) && path.is_file())
}

/// Decoded path below the root, without query or fragment.
///
/// `None` if a segment climbs out with `..` or the bytes are not UTF-8.
fn request_path(url: &str) -> Option<PathBuf> {
    let raw = url.split(['?', '#']).next().unwrap_or_default();
    let decoded: Cow<'_, str> = percent_decode_str(raw).decode_utf8().ok()?;

    let mut rel = PathBuf::new();
    for component in Path::new(decoded.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => rel.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(rel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn build_root() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("index.html"), "home").unwrap();
        fs::write(dir.path().join("about.html"), "about").unwrap();
        fs::write(dir.path().join("docs/index.html"), "docs").unwrap();
        fs::write(dir.path().join("a b.css"), "").unwrap();
        dir
    }

    #[test]
    fn test_resolves_files_and_indexes() {
        let dir = build_root();
        let root = dir.path().canonicalize().unwrap();
        assert_eq!(resolve_path("/", dir.path()), Some(root.join("index.html")));
        assert_eq!(
            resolve_path("/docs/?x=1", dir.path()),
            Some(root.join("docs/index.html"))
        );
        assert_eq!(resolve_path("/a%20b.css#top", dir.path()), Some(root.join("a b.css")));
        assert_eq!(resolve_path("/missing.js", dir.path()), None);
    }

    #[test]
    fn test_clean_url_fallback() {
        let dir = build_root();
        let root = dir.path().canonicalize().unwrap();
        assert_eq!(resolve_path("/about", dir.path()), Some(root.join("about.html")));
    }

    #[test]
    fn test_rejects_traversal() {
        let dir = build_root();
        assert_eq!(resolve_path("/../etc/passwd", dir.path()), None);
        assert_eq!(resolve_path("/docs/%2e%2e/%2e%2e/x", dir.path()), None);
        assert_eq!(request_path("/docs/../index.html"), None);
        assert_eq!(request_path("/./styles/app.css"), Some(PathBuf::from("styles/app.css")));
    }
}
