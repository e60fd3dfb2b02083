//! Stylesheet processing.
//!
//! Steps, in order:
//!
//! ```text
//! compile (grass) → parse (lightningcss) → group @media → purge unused → px→rem → prefix + print
//! ```
//!
//! The compiled CSS is parsed once; every later step edits the lightningcss
//! rule tree in place.

mod compile;
pub mod media;
pub mod prefix;
pub mod purge;
pub mod rem;

pub use compile::compile_sass;
pub use purge::Purger;

use anyhow::{Result, anyhow};
use lightningcss::stylesheet::{ParserOptions, StyleSheet};
use std::path::Path;

use crate::config::StylesConfig;
use crate::core::Mode;

/// Shared inputs for every stylesheet in one styles run.
pub struct StyleContext<'a> {
    pub config: &'a StylesConfig,
    pub purger: &'a Purger,
    pub styles_root: &'a Path,
    pub mode: Mode,
}

/// Final stylesheet text and, in dev mode, its source map.
#[derive(Debug)]
pub struct CompiledStyle {
    pub css: String,
    pub map: Option<String>,
}

/// Parse plain CSS into a rule tree. `filename` only labels errors.
pub fn parse_stylesheet<'i>(css: &'i str, filename: &str) -> Result<StyleSheet<'i>> {
    StyleSheet::parse(
        css,
        ParserOptions {
            filename: filename.to_string(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| anyhow!("{filename}: {e}"))
}

/// Run the full stylesheet chain on one source file.
///
/// `name` is recorded as the source map's source, with `source` as its
/// content.
pub fn process_stylesheet(
    source: &str,
    path: &Path,
    name: &str,
    ctx: &StyleContext<'_>,
) -> Result<CompiledStyle> {
    let compiled = compile_sass(source, path, ctx.styles_root)?;
    let mut stylesheet = parse_stylesheet(&compiled, name)?;
    media::group_media_queries(&mut stylesheet.rules);
    ctx.purger.purge(&mut stylesheet.rules);
    rem::convert(&mut stylesheet, &ctx.config.rem);

    let printed = prefix::prefix_and_print(
        stylesheet,
        prefix::Origin { name, source },
        ctx.mode.build,
        ctx.mode.dev,
    )?;
    Ok(CompiledStyle {
        css: printed.code,
        map: printed.map,
    })
}
