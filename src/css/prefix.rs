//! Vendor prefixing, final printing and source maps via lightningcss.

use anyhow::{Result, anyhow};
use lightningcss::stylesheet::{MinifyOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use parcel_sourcemap::SourceMap;

/// Browser versions are encoded as `major << 16 | minor << 8`.
const fn version(major: u32, minor: u32) -> Option<u32> {
    Some((major << 16) | (minor << 8))
}

/// Fixed prefixing target set (roughly "last 2 versions, > 0.5%").
pub fn targets() -> Targets {
    Targets::from(Browsers {
        android: version(4, 4),
        chrome: version(90, 0),
        edge: version(90, 0),
        firefox: version(88, 0),
        ie: version(11, 0),
        ios_saf: version(12, 0),
        opera: version(76, 0),
        safari: version(12, 0),
        samsung: version(14, 0),
    })
}

/// Printed stylesheet plus optional source map JSON.
#[derive(Debug)]
pub struct Printed {
    pub code: String,
    pub map: Option<String>,
}

/// The authored file a stylesheet came from, recorded in its source map.
pub struct Origin<'a> {
    pub name: &'a str,
    pub source: &'a str,
}

/// Prefix `stylesheet` for [`targets`], then print it.
///
/// `minify` prints at the smallest form; `source_map` records a map whose
/// single source is `origin.name` with the authored `origin.source` as its
/// content.
pub fn prefix_and_print(
    mut stylesheet: StyleSheet<'_>,
    origin: Origin<'_>,
    minify: bool,
    source_map: bool,
) -> Result<Printed> {
    stylesheet
        .minify(MinifyOptions {
            targets: targets(),
            ..MinifyOptions::default()
        })
        .map_err(|e| anyhow!("{e}"))?;

    let mut map = if source_map {
        let mut map = SourceMap::new("/");
        map.add_source(origin.name);
        map.set_source_content(0, origin.source)
            .map_err(|e| anyhow!("source map: {e:?}"))?;
        Some(map)
    } else {
        None
    };

    let result = stylesheet
        .to_css(PrinterOptions {
            minify,
            source_map: map.as_mut(),
            targets: targets(),
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("{e}"))?;

    let map = map
        .map(|mut map| map.to_json(None))
        .transpose()
        .map_err(|e| anyhow!("source map: {e:?}"))?;

    Ok(Printed {
        code: result.code,
        map,
    })
}
