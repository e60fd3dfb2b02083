//! Sass/SCSS compilation via grass.

use anyhow::{Result, anyhow};
use std::path::Path;

/// Compile one stylesheet to expanded CSS.
///
/// `path` is the file the source was read from. Imports resolve against its
/// directory, then the styles root. Plain `.css` input goes through the same
/// compiler; `.css` files are parsed with the CSS syntax.
pub fn compile_sass(source: &str, path: &Path, styles_root: &Path) -> Result<String> {
    let syntax = match path.extension().and_then(|e| e.to_str()) {
        Some("css") => grass::InputSyntax::Css,
        Some("sass") => grass::InputSyntax::Sass,
        _ => grass::InputSyntax::Scss,
    };
    let mut options = grass::Options::default()
        .style(grass::OutputStyle::Expanded)
        .input_syntax(syntax);
    if let Some(dir) = path.parent() {
        options = options.load_path(dir);
    }
    options = options.load_path(styles_root);

    grass::from_string(source, &options).map_err(|e| anyhow!("{e}"))
}
