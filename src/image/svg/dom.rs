//! Minimal owned XML tree for SVG rewriting.
//!
//! Parsed with `quick-xml`. Attribute values and text are kept in their
//! escaped source form so serialisation is lossless for everything the
//! cleanup passes do not touch.

use anyhow::{Context, Result, bail};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// A node in the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    /// `<?xml ...?>` declaration or other processing instruction (inner text).
    ProcInst(String),
    Doctype(String),
}

/// An element with ordered attributes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, key: &str) -> bool {
        self.attrs.iter().any(|(k, _)| k == key)
    }

    /// Set or replace an attribute, keeping its position if present.
    pub fn set_attr(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((key.to_string(), value)),
        }
    }

    pub fn remove_attr(&mut self, key: &str) -> Option<String> {
        let idx = self.attrs.iter().position(|(k, _)| k == key)?;
        Some(self.attrs.remove(idx).1)
    }

    /// Local name without namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Children other than whitespace-only text.
    pub fn significant_children(&self) -> impl Iterator<Item = &Node> {
        self.children
            .iter()
            .filter(|n| !matches!(n, Node::Text(t) if t.trim().is_empty()))
    }

    /// Visit this element and all descendants, parents first.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        f(self);
        for child in &mut self.children {
            if let Node::Element(e) = child {
                e.walk_mut(f);
            }
        }
    }
}

/// A parsed document: prolog nodes, the root element and trailing nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub nodes: Vec<Node>,
}

impl Document {
    /// Parse an SVG document.
    pub fn parse(source: &str) -> Result<Self> {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text(false);

        // Stack of open elements; index 0 collects top-level nodes.
        let mut stack: Vec<Element> = vec![Element::new("")];

        loop {
            let event = reader
                .read_event()
                .with_context(|| format!("invalid svg at byte {}", reader.buffer_position()))?;
            match event {
                Event::Start(e) => stack.push(start_element(&e)?),
                Event::Empty(e) => push_node(&mut stack, Node::Element(start_element(&e)?)),
                Event::End(e) => {
                    let name = utf8(e.name().as_ref())?;
                    let Some(done) = stack.pop().filter(|_| !stack.is_empty()) else {
                        bail!("unexpected closing tag </{name}>");
                    };
                    if done.name != name {
                        bail!("mismatched closing tag </{name}>, expected </{}>", done.name);
                    }
                    push_node(&mut stack, Node::Element(done));
                }
                Event::Text(t) => push_text(&mut stack, &utf8(&t)?),
                Event::GeneralRef(r) => push_text(&mut stack, &format!("&{};", utf8(&r)?)),
                Event::CData(t) => push_node(&mut stack, Node::CData(utf8(&t)?)),
                Event::Comment(t) => push_node(&mut stack, Node::Comment(utf8(&t)?)),
                Event::Decl(d) => push_node(&mut stack, Node::ProcInst(utf8(&d)?)),
                Event::PI(p) => push_node(&mut stack, Node::ProcInst(utf8(&p)?)),
                Event::DocType(t) => push_node(&mut stack, Node::Doctype(utf8(&t)?)),
                Event::Eof => break,
            }
        }

        if stack.len() != 1 {
            bail!("unclosed element <{}>", stack.last().map_or("", |e| e.name.as_str()));
        }
        let nodes = stack.pop().map(|top| top.children).unwrap_or_default();
        let doc = Self { nodes };
        if doc.root().is_none() {
            bail!("document has no root element");
        }
        Ok(doc)
    }

    pub fn root(&self) -> Option<&Element> {
        self.nodes.iter().find_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn root_mut(&mut self) -> Option<&mut Element> {
        self.nodes.iter_mut().find_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Serialise without added whitespace.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            write_node(&mut out, node);
        }
        out
    }
}

fn utf8(bytes: &[u8]) -> Result<String> {
    Ok(std::str::from_utf8(bytes)
        .context("svg is not valid utf-8")?
        .to_string())
}

fn start_element(e: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element::new(utf8(e.name().as_ref())?);
    for attr in e.attributes() {
        let attr = attr.context("malformed attribute")?;
        element
            .attrs
            .push((utf8(attr.key.as_ref())?, utf8(&attr.value)?));
    }
    Ok(element)
}

fn push_node(stack: &mut [Element], node: Node) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    }
}

/// Text and entity references arrive as separate events; join them.
fn push_text(stack: &mut [Element], text: &str) {
    let Some(parent) = stack.last_mut() else {
        return;
    };
    if let Some(Node::Text(prev)) = parent.children.last_mut() {
        prev.push_str(text);
    } else {
        parent.children.push(Node::Text(text.to_string()));
    }
}

pub fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Element(e) => write_element(out, e),
        Node::Text(t) => out.push_str(t),
        Node::CData(t) => {
            out.push_str("<![CDATA[");
            out.push_str(t);
            out.push_str("]]>");
        }
        Node::Comment(t) => {
            out.push_str("<!--");
            out.push_str(t);
            out.push_str("-->");
        }
        Node::ProcInst(t) => {
            out.push_str("<?");
            out.push_str(t);
            out.push_str("?>");
        }
        Node::Doctype(t) => {
            out.push_str("<!DOCTYPE ");
            out.push_str(t.trim_start());
            out.push('>');
        }
    }
}

pub fn write_element(out: &mut String, e: &Element) {
    out.push('<');
    out.push_str(&e.name);
    for (key, value) in &e.attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&value.replace('"', "&quot;"));
        out.push('"');
    }
    if e.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    for child in &e.children {
        write_node(out, child);
    }
    out.push_str("</");
    out.push_str(&e.name);
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;

    const ICON: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">
<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><!-- icon --><title>A &amp; B</title><path d="M0 0h24v24H0z" fill='none'/></svg>"#;

    #[test]
    fn test_parse_structure() {
        let doc = Document::parse(ICON).unwrap();
        assert!(matches!(&doc.nodes[0], Node::ProcInst(p) if p.starts_with("xml")));
        assert!(doc.nodes.iter().any(|n| matches!(n, Node::Doctype(_))));

        let root = doc.root().unwrap();
        assert_eq!(root.name, "svg");
        assert_eq!(root.attr("viewBox"), Some("0 0 24 24"));
        let names: Vec<_> = root.child_elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["title", "path"]);
    }

    #[test]
    fn test_entities_preserved() {
        let doc = Document::parse(ICON).unwrap();
        let xml = doc.to_xml();
        assert!(xml.contains("<title>A &amp; B</title>"));
        assert!(xml.contains(r#"<path d="M0 0h24v24H0z" fill="none"/>"#));
        assert!(xml.contains("<!-- icon -->"));
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    }

    #[test]
    fn test_reparse_is_stable() {
        let once = Document::parse(ICON).unwrap().to_xml();
        let twice = Document::parse(&once).unwrap().to_xml();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_attr_helpers() {
        let mut e = Element::new("sodipodi:namedview");
        e.set_attr("id", "a");
        e.set_attr("id", "b");
        assert_eq!(e.attrs.len(), 1);
        assert_eq!(e.attr("id"), Some("b"));
        assert_eq!(e.local_name(), "namedview");
        assert_eq!(e.remove_attr("id").as_deref(), Some("b"));
        assert!(!e.has_attr("id"));
    }

    #[test]
    fn test_errors() {
        assert!(Document::parse("<svg><g></svg>").is_err());
        assert!(Document::parse("<!-- nothing -->").is_err());
        assert!(Document::parse("</svg>").is_err());
    }
}
