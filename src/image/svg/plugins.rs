//! SVG cleanup passes.
//!
//! Enabled passes always run in [`ORDER`], regardless of the order they are
//! listed in config, so removals happen before structural rewrites.

use std::sync::LazyLock;

use regex::Regex;

use super::dom::{Document, Element, Node};
use crate::asset::minify::{minify_css, minify_declarations};
use crate::config::SvgPlugin;

/// Execution order of the cleanup passes.
pub const ORDER: [SvgPlugin; 18] = [
    SvgPlugin::RemoveDoctype,
    SvgPlugin::RemoveXmlProcInst,
    SvgPlugin::RemoveComments,
    SvgPlugin::RemoveMetadata,
    SvgPlugin::RemoveEditorsNsData,
    SvgPlugin::CleanupAttrs,
    SvgPlugin::MinifyStyles,
    SvgPlugin::RemoveTitle,
    SvgPlugin::RemoveDesc,
    SvgPlugin::CleanupNumericValues,
    SvgPlugin::RemoveHiddenElems,
    SvgPlugin::RemoveEmptyText,
    SvgPlugin::ConvertShapeToPath,
    SvgPlugin::ConvertEllipseToCircle,
    SvgPlugin::CollapseGroups,
    SvgPlugin::RemoveEmptyAttrs,
    SvgPlugin::RemoveEmptyContainers,
    SvgPlugin::MergePaths,
];

const EDITOR_NAMESPACES: &[&str] = &[
    "http://creativecommons.org/ns#",
    "http://inkscape.sourceforge.net/DTD/sodipodi-0.dtd",
    "http://ns.adobe.com/AdobeIllustrator/10.0/",
    "http://ns.adobe.com/AdobeSVGViewerExtensions/3.0/",
    "http://ns.adobe.com/Extensibility/1.0/",
    "http://ns.adobe.com/Flows/1.0/",
    "http://ns.adobe.com/GenericCustomNamespace/1.0/",
    "http://ns.adobe.com/Graphs/1.0/",
    "http://ns.adobe.com/ImageReplacement/1.0/",
    "http://ns.adobe.com/SaveForWeb/1.0/",
    "http://ns.adobe.com/Variables/1.0/",
    "http://ns.adobe.com/XPath/1.0/",
    "http://purl.org/dc/elements/1.1/",
    "http://schemas.microsoft.com/visio/2003/SVGExtensions/",
    "http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd",
    "http://taptrix.com/vectorillustrator/svg_extensions",
    "http://www.bohemiancoding.com/sketch/ns",
    "http://www.figma.com/figma/ns",
    "http://www.inkscape.org/namespaces/inkscape",
    "http://www.serif.com/",
    "http://www.vector.evaxdesign.sk",
    "http://www.w3.org/1999/02/22-rdf-syntax-ns#",
];

/// Elements whose whitespace text is significant.
const TEXT_ELEMENTS: &[&str] = &["text", "tspan", "textPath", "style", "title", "desc", "script"];

const CONTAINERS: &[&str] = &[
    "a",
    "defs",
    "g",
    "marker",
    "mask",
    "missing-glyph",
    "pattern",
    "switch",
    "symbol",
];

/// Attributes that must survive even when empty.
const CONDITIONAL_ATTRS: &[&str] = &["requiredExtensions", "requiredFeatures", "systemLanguage"];

/// Attributes never treated as numbers.
const NON_NUMERIC_ATTRS: &[&str] = &["id", "class", "version", "d", "points", "style"];

/// Group attributes that block collapsing into the child.
const GROUP_BLOCKERS: &[&str] = &["id", "filter", "clip-path", "mask"];

/// Attributes that make overlapping merged paths render differently.
const MERGE_BLOCKERS: &[&str] = &[
    "id",
    "clip-path",
    "mask",
    "marker-start",
    "marker-mid",
    "marker-end",
    "opacity",
    "fill-opacity",
    "stroke-opacity",
    "fill-rule",
    "transform",
    "style",
];

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static NUMERIC_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([-+]?\d*\.?\d+(?:[eE][-+]?\d+)?)(px|pt|pc|mm|cm|m|in|ft|em|ex|%)?$")
        .expect("valid regex")
});

/// Run every enabled pass over the document.
pub fn cleanup(doc: &mut Document, plugins: &[SvgPlugin], precision: u8) {
    strip_whitespace(doc);
    for plugin in ORDER.iter().filter(|p| plugins.contains(p)) {
        apply(doc, *plugin, precision);
    }
}

fn apply(doc: &mut Document, plugin: SvgPlugin, precision: u8) {
    match plugin {
        SvgPlugin::RemoveDoctype => retain(doc, &|n| !matches!(n, Node::Doctype(_))),
        SvgPlugin::RemoveXmlProcInst => retain(doc, &|n| !is_xml_decl(n)),
        SvgPlugin::RemoveComments => {
            retain(doc, &|n| !matches!(n, Node::Comment(c) if !c.starts_with('!')));
        }
        SvgPlugin::RemoveMetadata => retain(doc, &|n| !is_element(n, "metadata")),
        SvgPlugin::RemoveTitle => retain(doc, &|n| !is_element(n, "title")),
        SvgPlugin::RemoveDesc => retain(doc, &|n| !is_element(n, "desc")),
        SvgPlugin::RemoveEditorsNsData => remove_editors_ns_data(doc),
        SvgPlugin::CleanupAttrs => each_element(doc, &mut cleanup_attrs),
        SvgPlugin::MinifyStyles => each_element(doc, &mut minify_styles),
        SvgPlugin::CleanupNumericValues => {
            each_element(doc, &mut |e| cleanup_numeric_values(e, precision));
        }
        SvgPlugin::RemoveHiddenElems => retain(doc, &|n| !is_hidden(n)),
        SvgPlugin::RemoveEmptyText => retain(doc, &|n| !is_empty_text(n)),
        SvgPlugin::ConvertShapeToPath => each_element(doc, &mut convert_shape_to_path),
        SvgPlugin::ConvertEllipseToCircle => each_element(doc, &mut convert_ellipse_to_circle),
        SvgPlugin::CollapseGroups => {
            if let Some(root) = doc.root_mut() {
                collapse_groups(root);
            }
        }
        SvgPlugin::RemoveEmptyAttrs => each_element(doc, &mut |e| {
            e.attrs
                .retain(|(k, v)| !v.is_empty() || CONDITIONAL_ATTRS.contains(&k.as_str()));
        }),
        SvgPlugin::RemoveEmptyContainers => {
            if let Some(root) = doc.root_mut() {
                remove_empty_containers(root);
            }
        }
        SvgPlugin::MergePaths => each_element(doc, &mut merge_paths),
    }
}

/// Remove attributes whose name matches `pattern`.
/// With `preserve_current_color`, values equal to `currentColor` are kept.
pub fn remove_attrs(doc: &mut Document, pattern: &Regex, preserve_current_color: bool) {
    each_element(doc, &mut |e| {
        e.attrs.retain(|(k, v)| {
            !pattern.is_match(k)
                || (preserve_current_color && v.trim().eq_ignore_ascii_case("currentColor"))
        });
    });
}

// ============================================================================
// Traversal
// ============================================================================

/// Drop matching nodes everywhere except the root element itself.
fn retain(doc: &mut Document, keep: &impl Fn(&Node) -> bool) {
    doc.nodes.retain(|n| matches!(n, Node::Element(_)) || keep(n));
    for node in &mut doc.nodes {
        if let Node::Element(e) = node {
            retain_in(e, keep);
        }
    }
}

fn retain_in(element: &mut Element, keep: &impl Fn(&Node) -> bool) {
    element.children.retain(|n| keep(n));
    for child in &mut element.children {
        if let Node::Element(e) = child {
            retain_in(e, keep);
        }
    }
}

fn each_element(doc: &mut Document, f: &mut impl FnMut(&mut Element)) {
    for node in &mut doc.nodes {
        if let Node::Element(e) = node {
            e.walk_mut(f);
        }
    }
}

fn is_element(node: &Node, name: &str) -> bool {
    matches!(node, Node::Element(e) if e.name == name)
}

fn is_xml_decl(node: &Node) -> bool {
    matches!(node, Node::ProcInst(p) if p == "xml" || p.starts_with("xml ") || p.starts_with("xml\t"))
}

/// Drop whitespace-only text outside text-bearing elements.
fn strip_whitespace(doc: &mut Document) {
    doc.nodes
        .retain(|n| !matches!(n, Node::Text(t) if t.trim().is_empty()));
    if let Some(root) = doc.root_mut() {
        strip_element_whitespace(root);
    }
}

fn strip_element_whitespace(element: &mut Element) {
    if TEXT_ELEMENTS.contains(&element.local_name()) {
        return;
    }
    element
        .children
        .retain(|n| !matches!(n, Node::Text(t) if t.trim().is_empty()));
    for child in &mut element.children {
        if let Node::Element(e) = child {
            strip_element_whitespace(e);
        }
    }
}

// ============================================================================
// Passes
// ============================================================================

fn remove_editors_ns_data(doc: &mut Document) {
    let mut prefixes = Vec::new();
    each_element(doc, &mut |e| {
        e.attrs.retain(|(k, v)| match k.strip_prefix("xmlns:") {
            Some(prefix) if EDITOR_NAMESPACES.contains(&v.as_str()) => {
                prefixes.push(prefix.to_string());
                false
            }
            _ => true,
        });
    });
    if prefixes.is_empty() {
        return;
    }

    let has_prefix = |name: &str| {
        name.split_once(':')
            .is_some_and(|(p, _)| prefixes.iter().any(|known| known == p))
    };
    retain(doc, &|n| !matches!(n, Node::Element(e) if has_prefix(&e.name)));
    each_element(doc, &mut |e| e.attrs.retain(|(k, _)| !has_prefix(k)));
}

fn cleanup_attrs(element: &mut Element) {
    for (_, value) in &mut element.attrs {
        if value.contains(char::is_whitespace) {
            *value = WHITESPACE.replace_all(value.trim(), " ").into_owned();
        }
    }
}

fn minify_styles(element: &mut Element) {
    if let Some(style) = element.attr("style") {
        match minify_declarations(style) {
            Ok(minified) => element.set_attr("style", minified),
            Err(_) => crate::debug!("images"; "style attribute left as is: css did not parse"),
        }
    }

    if element.name != "style" {
        return;
    }
    let mut css = String::new();
    let mut had_cdata = false;
    for child in &element.children {
        match child {
            Node::Text(t) if !t.contains('&') => css.push_str(t),
            Node::CData(t) => {
                had_cdata = true;
                css.push_str(t);
            }
            Node::Comment(_) => {}
            _ => return,
        }
    }
    let Ok(minified) = minify_css(&css) else {
        crate::debug!("images"; "style element left as is: css did not parse");
        return;
    };
    element.children.clear();
    if minified.is_empty() {
        return;
    }
    if had_cdata || minified.contains(['<', '&']) {
        element.children.push(Node::CData(minified));
    } else {
        element.children.push(Node::Text(minified));
    }
}


fn cleanup_numeric_values(element: &mut Element, precision: u8) {
    for (key, value) in &mut element.attrs {
        if NON_NUMERIC_ATTRS.contains(&key.as_str()) || key.starts_with("xmlns") {
            continue;
        }
        if key.as_str() == "viewBox" {
            let parts: Option<Vec<String>> = value
                .split([' ', ','])
                .filter(|s| !s.is_empty())
                .map(|s| s.parse::<f64>().ok().map(|n| format_number(n, precision)))
                .collect();
            if let Some(parts) = parts {
                *value = parts.join(" ");
            }
            continue;
        }
        let Some(caps) = NUMERIC_VALUE.captures(value.trim()) else {
            continue;
        };
        let Ok(number) = caps[1].parse::<f64>() else {
            continue;
        };
        let unit = caps.get(2).map_or("", |m| m.as_str());
        let unit = if unit == "px" { "" } else { unit };
        *value = format!("{}{unit}", format_number(number, precision));
    }
}

/// Round to `precision` decimals and print in the shortest form (`0.5` → `.5`).
pub fn format_number(value: f64, precision: u8) -> String {
    let precision = usize::from(precision);
    let mut s = format!("{value:.precision$}");
    if s.contains('.') {
        s = s.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    if s == "-0" {
        return "0".to_string();
    }
    if let Some(rest) = s.strip_prefix("0.") {
        return format!(".{rest}");
    }
    if let Some(rest) = s.strip_prefix("-0.") {
        return format!("-.{rest}");
    }
    s
}

fn number_attr(element: &Element, key: &str) -> Option<f64> {
    element.attr(key).and_then(|v| v.trim().parse().ok())
}

fn is_zero(element: &Element, key: &str) -> bool {
    number_attr(element, key) == Some(0.0)
}

fn is_hidden(node: &Node) -> bool {
    let Node::Element(e) = node else {
        return false;
    };
    if e.attr("display") == Some("none") || e.attr("opacity") == Some("0") {
        return true;
    }
    match e.name.as_str() {
        "circle" => is_zero(e, "r"),
        "ellipse" => is_zero(e, "rx") || is_zero(e, "ry"),
        "rect" | "image" | "pattern" => is_zero(e, "width") || is_zero(e, "height"),
        "path" => e.attr("d").is_none_or(|d| d.trim().is_empty()),
        "polyline" | "polygon" => e.attr("points").is_none_or(|p| p.trim().is_empty()),
        _ => false,
    }
}

fn is_empty_text(node: &Node) -> bool {
    let Node::Element(e) = node else {
        return false;
    };
    match e.name.as_str() {
        "text" | "tspan" => e.significant_children().next().is_none(),
        "tref" => !e.has_attr("xlink:href") && !e.has_attr("href"),
        _ => false,
    }
}

fn convert_shape_to_path(element: &mut Element) {
    let d = match element.name.as_str() {
        "rect" => rect_path(element),
        "line" => line_path(element),
        "polyline" => points_path(element, false),
        "polygon" => points_path(element, true),
        _ => None,
    };
    let Some((d, consumed)) = d else {
        return;
    };
    element.attrs.retain(|(k, _)| !consumed.contains(&k.as_str()));
    element.name = "path".to_string();
    element.attrs.push(("d".to_string(), d));
}

type ShapePath = (String, &'static [&'static str]);

fn rect_path(e: &Element) -> Option<ShapePath> {
    let rounded = ["rx", "ry"]
        .iter()
        .any(|k| e.attr(k).is_some_and(|v| v.trim() != "0"));
    if rounded {
        return None;
    }
    let coord = |k: &str| match e.attr(k) {
        None => Some(0.0),
        Some(v) => v.trim().parse::<f64>().ok(),
    };
    let (x, y) = (coord("x")?, coord("y")?);
    let (w, h) = (number_attr(e, "width")?, number_attr(e, "height")?);
    let f = |n: f64| format_number(n, 3);
    Some((
        format!("M{} {}H{}V{}H{}z", f(x), f(y), f(x + w), f(y + h), f(x)),
        &["x", "y", "width", "height", "rx", "ry"],
    ))
}

fn line_path(e: &Element) -> Option<ShapePath> {
    let coord = |k: &str| match e.attr(k) {
        None => Some(0.0),
        Some(v) => v.trim().parse::<f64>().ok(),
    };
    let f = |n: f64| format_number(n, 3);
    Some((
        format!(
            "M{} {} {} {}",
            f(coord("x1")?),
            f(coord("y1")?),
            f(coord("x2")?),
            f(coord("y2")?)
        ),
        &["x1", "y1", "x2", "y2"],
    ))
}

fn points_path(e: &Element, close: bool) -> Option<ShapePath> {
    let coords: Vec<f64> = e
        .attr("points")?
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().ok())
        .collect::<Option<_>>()?;
    if coords.len() < 4 {
        return None;
    }
    let pairs: Vec<String> = coords
        .chunks_exact(2)
        .map(|p| format!("{} {}", format_number(p[0], 3), format_number(p[1], 3)))
        .collect();
    let mut d = format!("M{}", pairs.join(" "));
    if close {
        d.push('z');
    }
    Some((d, &["points"]))
}

fn convert_ellipse_to_circle(element: &mut Element) {
    if element.name != "ellipse" {
        return;
    }
    let rx = element.attr("rx").unwrap_or("0").trim().to_string();
    let ry = element.attr("ry").unwrap_or("0").trim().to_string();
    let r = match (rx.as_str(), ry.as_str()) {
        (a, b) if a == b => rx.clone(),
        ("auto", _) => ry.clone(),
        (_, "auto") => rx.clone(),
        _ => return,
    };
    element.name = "circle".to_string();
    element.remove_attr("rx");
    element.remove_attr("ry");
    element.set_attr("r", r);
}

/// Collapse groups bottom-up: move attributes onto a single child, then
/// unwrap attribute-less groups.
fn collapse_groups(element: &mut Element) {
    for child in &mut element.children {
        if let Node::Element(e) = child {
            collapse_groups(e);
        }
    }
    if element.name == "switch" {
        return;
    }

    let mut children = Vec::with_capacity(element.children.len());
    for child in std::mem::take(&mut element.children) {
        match child {
            Node::Element(mut g) if g.name == "g" => {
                move_attrs_to_child(&mut g);
                if g.attrs.is_empty() {
                    children.extend(g.children);
                } else {
                    children.push(Node::Element(g));
                }
            }
            other => children.push(other),
        }
    }
    element.children = children;
}

fn move_attrs_to_child(group: &mut Element) {
    if group.attrs.is_empty() || GROUP_BLOCKERS.iter().any(|k| group.has_attr(k)) {
        return;
    }
    let [Node::Element(child)] = group.children.as_mut_slice() else {
        return;
    };
    if child.has_attr("id") {
        return;
    }
    let movable = group.attrs.iter().all(|(k, v)| {
        k == "transform" || child.attr(k).is_none_or(|existing| existing == v.as_str())
    });
    if !movable {
        return;
    }
    for (key, value) in std::mem::take(&mut group.attrs) {
        match child.attr(&key) {
            Some(existing) if key == "transform" => {
                let combined = format!("{value} {existing}");
                child.set_attr(&key, combined);
            }
            Some(_) => {}
            None => child.attrs.insert(0, (key, value)),
        }
    }
}

fn remove_empty_containers(element: &mut Element) {
    for child in &mut element.children {
        if let Node::Element(e) = child {
            remove_empty_containers(e);
        }
    }
    element.children.retain(|n| match n {
        Node::Element(e) => !is_empty_container(e),
        _ => true,
    });
}

fn is_empty_container(e: &Element) -> bool {
    if !CONTAINERS.contains(&e.name.as_str()) || e.significant_children().next().is_some() {
        return false;
    }
    match e.name.as_str() {
        "g" => !e.has_attr("filter"),
        "pattern" => e.attrs.is_empty(),
        "mask" => !e.has_attr("id"),
        _ => true,
    }
}

fn merge_paths(element: &mut Element) {
    let mut merged: Vec<Node> = Vec::with_capacity(element.children.len());
    for child in std::mem::take(&mut element.children) {
        if let Node::Element(next) = &child
            && let Some(Node::Element(prev)) = merged.last_mut()
            && can_merge(prev, next)
        {
            let tail = next.attr("d").unwrap_or_default().trim();
            let tail = match tail.strip_prefix('m') {
                Some(rest) => format!("M{rest}"),
                None => tail.to_string(),
            };
            let head = prev.attr("d").unwrap_or_default().trim_end().to_string();
            prev.set_attr("d", format!("{head}{tail}"));
            continue;
        }
        merged.push(child);
    }
    element.children = merged;
}

fn can_merge(a: &Element, b: &Element) -> bool {
    if a.name != "path" || b.name != "path" || !a.children.is_empty() || !b.children.is_empty() {
        return false;
    }
    if MERGE_BLOCKERS.iter().any(|k| a.has_attr(k) || b.has_attr(k)) {
        return false;
    }
    fn others(e: &Element) -> Vec<&(String, String)> {
        let mut attrs: Vec<_> = e.attrs.iter().filter(|(k, _)| k != "d").collect();
        attrs.sort();
        attrs
    }
    others(a) == others(b)
}
