//! SVG cleanup and sprite assembly.
//!
//! # Modules
//!
//! - [`dom`]: owned XML tree parsed with `quick-xml`
//! - [`plugins`]: cleanup passes selected by `[images.svg] plugins`
//! - [`sprite`]: `<symbol>` sprite built from cleaned icons

pub mod dom;
pub mod plugins;
pub mod sprite;

use anyhow::{Context, Result};

use crate::config::SvgConfig;
use dom::Document;

/// Clean one standalone SVG file.
pub fn optimize_svg(content: &[u8], config: &SvgConfig) -> Result<Vec<u8>> {
    let source = std::str::from_utf8(content).context("svg is not valid utf-8")?;
    let mut doc = Document::parse(source)?;
    plugins::cleanup(&mut doc, &config.plugins, config.precision);
    Ok(doc.to_xml().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimize_svg() {
        let source = b"<?xml version=\"1.0\"?>\n<svg xmlns=\"http://www.w3.org/2000/svg\">\n  <title>logo</title>\n  <ellipse rx=\"2.4\" ry=\"2.4\"/>\n</svg>\n";
        let out = optimize_svg(source, &SvgConfig::default()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"<svg xmlns="http://www.w3.org/2000/svg"><circle r="2"/></svg>"#
        );
    }

    #[test]
    fn test_rejects_non_utf8() {
        assert!(optimize_svg(&[0xff, 0xfe, 0x00], &SvgConfig::default()).is_err());
    }
}
