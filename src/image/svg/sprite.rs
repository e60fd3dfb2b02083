//! Inline SVG sprite assembly.
//!
//! ```text
//! <svg xmlns="http://www.w3.org/2000/svg">
//!   <defs>..merged icon defs..</defs>
//!   <symbol id="icon_NAME" viewBox=".." fill="currentColor">..</symbol>
//! </svg>
//! ```

use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use regex::Regex;

use super::dom::{Document, Element, Node};
use super::plugins::{cleanup, remove_attrs};
use crate::config::SvgConfig;

pub const SPRITE_NAME: &str = "sprite.svg";
pub const ID_PREFIX: &str = "icon_";

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Presentation attributes stripped so icons inherit colour from CSS.
static PAINT_ATTRS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:clip|fill|stroke).*$").expect("valid regex"));

/// One source icon: file stem and SVG text.
#[derive(Debug, Clone)]
pub struct SpriteIcon<'a> {
    pub name: &'a str,
    pub source: &'a str,
}

/// Build one sprite document from the icons, in the order given.
pub fn build_sprite(icons: &[SpriteIcon<'_>], config: &SvgConfig) -> Result<String> {
    let mut root = Element::new("svg");
    root.set_attr("xmlns", SVG_NS);
    let mut defs = Element::new("defs");
    let mut symbols = Vec::with_capacity(icons.len());

    for icon in icons {
        let id = format!("{ID_PREFIX}{}", icon.name);
        if symbols.iter().any(|s: &Element| s.attr("id") == Some(id.as_str())) {
            bail!("duplicate icon id `{id}`");
        }

        let mut doc = Document::parse(icon.source).with_context(|| format!("icon `{}`", icon.name))?;
        cleanup(&mut doc, &config.plugins, config.precision);
        remove_attrs(&mut doc, &PAINT_ATTRS, true);
        let Some(svg) = doc.root_mut() else {
            bail!("icon `{}` has no root element", icon.name);
        };

        for (key, value) in &svg.attrs {
            if key.starts_with("xmlns:") && !root.has_attr(key) {
                root.attrs.push((key.clone(), value.clone()));
            }
        }
        symbols.push(to_symbol(svg, id, &mut defs));
    }

    if !defs.children.is_empty() {
        root.children.push(Node::Element(defs));
    }
    for mut symbol in symbols {
        symbol.set_attr("fill", "currentColor");
        root.children.push(Node::Element(symbol));
    }

    Ok(Document {
        nodes: vec![Node::Element(root)],
    }
    .to_xml())
}

/// Turn an icon root into a `<symbol>`, hoisting its `<defs>` content.
fn to_symbol(svg: &mut Element, id: String, defs: &mut Element) -> Element {
    let mut symbol = Element::new("symbol");
    symbol.set_attr("id", id);

    let view_box = svg.attr("viewBox").map(str::to_string).or_else(|| {
        let width = svg.attr("width")?.trim().parse::<f64>().ok()?;
        let height = svg.attr("height")?.trim().parse::<f64>().ok()?;
        Some(format!("0 0 {width} {height}"))
    });
    if let Some(view_box) = view_box {
        symbol.set_attr("viewBox", view_box);
    }
    if let Some(aspect) = svg.attr("preserveAspectRatio") {
        symbol.set_attr("preserveAspectRatio", aspect.to_string());
    }

    for child in std::mem::take(&mut svg.children) {
        match child {
            Node::Element(e) if e.name == "defs" => defs.children.extend(e.children),
            other => symbol.children.push(other),
        }
    }
    symbol
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sprite(icons: &[(&str, &str)]) -> String {
        let icons: Vec<_> = icons
            .iter()
            .map(|(name, source)| SpriteIcon { name, source })
            .collect();
        build_sprite(&icons, &SvgConfig::default()).unwrap()
    }

    #[test]
    fn test_one_symbol_per_icon() {
        let out = sprite(&[
            (
                "arrow",
                r##"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><path d="M0 0h24" stroke="#000"/></svg>"##,
            ),
            (
                "close",
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16"><path d="M1 1l14 14" fill="red"/></svg>"#,
            ),
        ]);

        assert!(!out.contains("<?xml"));
        assert!(out.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg">"#));
        assert_eq!(out.matches("<symbol").count(), 2);
        assert!(out.contains(r#"<symbol id="icon_arrow" viewBox="0 0 24 24" fill="currentColor">"#));
        assert!(out.contains(r#"<symbol id="icon_close" viewBox="0 0 16 16" fill="currentColor">"#));
        assert!(!out.contains("stroke="));
        assert!(!out.contains(r#"fill="red""#));

        let doc = Document::parse(&out).unwrap();
        let root = doc.root().unwrap();
        assert!(root.child_elements().all(|s| s.attr("fill") == Some("currentColor")));
    }

    #[test]
    fn test_current_color_kept_and_defs_hoisted() {
        let out = sprite(&[(
            "dot",
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="0 0 8 8">"#,
                r##"<defs><circle id="c" r="4"/></defs><use xlink:href="#c" fill="currentColor"/></svg>"##,
            ),
        )]);
        assert!(out.contains(r#"xmlns:xlink="http://www.w3.org/1999/xlink""#));
        assert!(out.contains(r#"<defs><circle id="c" r="4"/></defs>"#));
        assert!(out.contains(r##"<use xlink:href="#c" fill="currentColor"/>"##));
    }

    #[test]
    fn test_invalid_icon_errors() {
        let icons = [SpriteIcon {
            name: "broken",
            source: "<svg><g></svg>",
        }];
        assert!(build_sprite(&icons, &SvgConfig::default()).is_err());
    }

    #[test]
    fn test_empty_sprite() {
        let out = build_sprite(&[], &SvgConfig::default()).unwrap();
        assert_eq!(out, r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#);
    }
}
