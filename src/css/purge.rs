//! Unused selector removal.
//!
//! The reference set is every `[A-Za-z0-9_-]+` word found in the view
//! sources. A selector survives when every class, id and type name it
//! mentions is in that set, or when it matches an allow-list regex.
//! Selectors inside `:not(...)` and other functional pseudo-classes are not
//! checked, attribute selectors always pass.

use lightningcss::properties::Property;
use lightningcss::rules::font_face::FontFaceProperty;
use lightningcss::rules::{CssRule, CssRuleList};
use lightningcss::selector::{Component, Selector};
use lightningcss::stylesheet::PrinterOptions;
use lightningcss::traits::ToCss;
use regex::Regex;
use rustc_hash::FxHashSet;
use std::sync::LazyLock;

static WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9_-]+").expect("valid regex"));

/// Purge settings plus the extracted reference words.
pub struct Purger {
    words: FxHashSet<String>,
    allow: Vec<Regex>,
    keep_font_face: bool,
    keep_keyframes: bool,
}

impl Purger {
    pub fn new<'a>(
        contents: impl IntoIterator<Item = &'a str>,
        allow: Vec<Regex>,
        keep_font_face: bool,
        keep_keyframes: bool,
    ) -> Self {
        let words = contents
            .into_iter()
            .flat_map(|content| WORD.find_iter(content).map(|m| m.as_str().to_string()))
            .collect();
        Self {
            words,
            allow,
            keep_font_face,
            keep_keyframes,
        }
    }

    /// Remove unused rules, then unused `@font-face`/`@keyframes` if asked.
    pub fn purge(&self, rules: &mut CssRuleList<'_>) {
        self.purge_rules(rules);
        if self.keep_font_face && self.keep_keyframes {
            return;
        }
        let mut used = UsedNames::default();
        used.collect(rules);
        self.purge_unused_at_rules(rules, &used);
    }

    fn purge_rules(&self, rules: &mut CssRuleList<'_>) {
        rules.0.retain_mut(|rule| {
            let children = match rule {
                CssRule::Style(style) => {
                    style.selectors.0.retain(|s| self.is_used(s));
                    return !style.selectors.0.is_empty();
                }
                CssRule::Media(r) => &mut r.rules,
                CssRule::Supports(r) => &mut r.rules,
                CssRule::LayerBlock(r) => &mut r.rules,
                CssRule::Container(r) => &mut r.rules,
                CssRule::MozDocument(r) => &mut r.rules,
                _ => return true,
            };
            self.purge_rules(children);
            !children.0.is_empty()
        });
    }

    /// Whether a single complex selector is referenced by the views.
    pub fn is_used(&self, selector: &Selector<'_>) -> bool {
        if !self.allow.is_empty() {
            let text = selector
                .to_css_string(PrinterOptions::default())
                .unwrap_or_default();
            if self.allow.iter().any(|re| re.is_match(&text)) {
                return true;
            }
        }
        selector_names(selector).iter().all(|name| match name {
            SelectorName::Type(tag) => {
                self.words.contains(tag.as_str()) || self.words.contains(&tag.to_ascii_lowercase())
            }
            SelectorName::Class(name) | SelectorName::Id(name) => {
                self.words.contains(name.as_str())
            }
        })
    }

    fn purge_unused_at_rules(&self, rules: &mut CssRuleList<'_>, used: &UsedNames) {
        rules.0.retain_mut(|rule| match rule {
            CssRule::FontFace(face) if !self.keep_font_face => face
                .properties
                .iter()
                .find_map(|p| match p {
                    FontFaceProperty::FontFamily(family) => Some(css_name(family)),
                    _ => None,
                })
                .is_some_and(|family| used.fonts.contains(&family)),
            CssRule::Keyframes(keyframes) if !self.keep_keyframes => {
                used.animations.contains(&css_name(&keyframes.name))
            }
            CssRule::Media(r) => {
                self.purge_unused_at_rules(&mut r.rules, used);
                true
            }
            CssRule::Supports(r) => {
                self.purge_unused_at_rules(&mut r.rules, used);
                true
            }
            _ => true,
        });
    }
}

#[derive(Debug, PartialEq)]
enum SelectorName {
    Type(String),
    Class(String),
    Id(String),
}

/// Class, id and type names of one complex selector.
///
/// Only the selector's own compounds are read; arguments of `:not()`,
/// `:is()` and friends live in nested selectors and are skipped.
fn selector_names(selector: &Selector<'_>) -> Vec<SelectorName> {
    selector
        .iter_raw_match_order()
        .filter_map(|component| match component {
            Component::LocalName(local) => Some(SelectorName::Type(local.name.0.to_string())),
            Component::Class(name) => Some(SelectorName::Class(name.0.to_string())),
            Component::ID(name) => Some(SelectorName::Id(name.0.to_string())),
            _ => None,
        })
        .collect()
}

/// A printed CSS value without its quotes.
fn css_name(value: &impl ToCss) -> String {
    value
        .to_css_string(PrinterOptions::default())
        .unwrap_or_default()
        .trim_matches(|c| c == '"' || c == '\'')
        .to_string()
}

/// Font families and animation names referenced by kept rules.
#[derive(Default)]
struct UsedNames {
    fonts: FxHashSet<String>,
    animations: FxHashSet<String>,
}

impl UsedNames {
    fn collect(&mut self, rules: &CssRuleList<'_>) {
        for rule in &rules.0 {
            match rule {
                CssRule::Style(style) => {
                    let block = &style.declarations;
                    for property in block.declarations.iter().chain(&block.important_declarations) {
                        self.collect_property(property);
                    }
                }
                CssRule::Media(r) => self.collect(&r.rules),
                CssRule::Supports(r) => self.collect(&r.rules),
                CssRule::LayerBlock(r) => self.collect(&r.rules),
                CssRule::Container(r) => self.collect(&r.rules),
                _ => {}
            }
        }
    }

    fn collect_property(&mut self, property: &Property<'_>) {
        let id = property.property_id();
        let target = match id.name() {
            "font" | "font-family" => &mut self.fonts,
            "animation" | "animation-name" => &mut self.animations,
            _ => return,
        };
        let Ok(value) = property.value_to_css_string(PrinterOptions::default()) else {
            return;
        };
        for part in value.split(',') {
            // Shorthands put the name among other space separated values
            target.extend(part.split_whitespace().map(unquote));
            target.insert(unquote(part));
        }
    }
}

fn unquote(s: &str) -> String {
    s.trim().trim_matches(|c| c == '"' || c == '\'').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parse_stylesheet;

    const VIEW: &str = r#"<html><body><div class="card card--active" id="main"><a href="/">x</a></div></body></html>"#;

    fn purger() -> Purger {
        Purger::new([VIEW], vec![Regex::new("js").unwrap()], true, true)
    }

    fn purge(purger: &Purger, css: &str) -> String {
        let mut sheet = parse_stylesheet(css, "a.css").unwrap();
        purger.purge(&mut sheet.rules);
        sheet.to_css(PrinterOptions::default()).unwrap().code
    }

    fn with_selector<R>(selector: &str, f: impl FnOnce(&Selector<'_>) -> R) -> R {
        let css = format!("{selector} {{ top: 0 }}");
        let sheet = parse_stylesheet(&css, "a.css").unwrap();
        let CssRule::Style(style) = &sheet.rules.0[0] else {
            panic!("expected a style rule")
        };
        f(&style.selectors.0[0])
    }

    fn used(purger: &Purger, selector: &str) -> bool {
        with_selector(selector, |s| purger.is_used(s))
    }

    #[test]
    fn test_selector_names() {
        let mut names = with_selector("div.card > a:hover::before", selector_names);
        // Match order walks compounds right to left
        names.sort_by_key(|n| format!("{n:?}"));
        assert_eq!(
            names,
            vec![
                SelectorName::Class("card".into()),
                SelectorName::Type("a".into()),
                SelectorName::Type("div".into()),
            ]
        );
        assert_eq!(
            with_selector(".x:not(.y) [data-a=\".z\"]", selector_names),
            vec![SelectorName::Class("x".into())]
        );
        assert_eq!(
            with_selector(".md\\:flex", selector_names),
            vec![SelectorName::Class("md:flex".into())]
        );
    }

    #[test]
    fn test_used_selectors_kept() {
        let p = purger();
        assert!(used(&p, ".card"));
        assert!(used(&p, ".card--active"));
        assert!(used(&p, "#main a"));
        assert!(used(&p, "body > div.card"));
        assert!(used(&p, "*"));
        assert!(used(&p, ":root"));
        assert!(!used(&p, ".missing"));
        assert!(!used(&p, "section .card"));
    }

    #[test]
    fn test_allow_list() {
        let p = purger();
        assert!(used(&p, ".js-toggle"));
        assert!(used(&p, ".no-js .card"));
    }

    #[test]
    fn test_purge_drops_unused_rules_and_selectors() {
        let css = ".card, .gone { top: 0 }\n.gone { top: 1px }\n@media (min-width: 1px) { .gone { top: 0 } }\n@media print { .card { top: 0 } }";
        let out = purge(&purger(), css);
        assert!(out.contains(".card {"));
        assert!(!out.contains(".gone"));
        assert!(!out.contains("min-width"));
        assert!(out.contains("@media print"));
    }

    #[test]
    fn test_font_face_and_keyframes_kept_by_default() {
        let css = "@font-face { font-family: \"Unused\"; src: url(a.woff2) }\n@keyframes fade { from { opacity: 0 } }";
        let mut sheet = parse_stylesheet(css, "a.css").unwrap();
        purger().purge(&mut sheet.rules);
        assert_eq!(sheet.rules.0.len(), 2);
    }

    #[test]
    fn test_unused_font_face_and_keyframes_removed() {
        let css = "\
@font-face { font-family: \"Used\"; src: url(a.woff2) }
@font-face { font-family: \"Unused\"; src: url(b.woff2) }
@keyframes fade { from { opacity: 0 } }
@keyframes spin { from { opacity: 0 } }
.card { font: 16px/1.2 \"Used\", sans-serif; animation: fade 1s ease }";
        let purger = Purger::new([VIEW], Vec::new(), false, false);
        let out = purge(&purger, css);
        assert!(out.contains("Used"));
        assert!(!out.contains("Unused"));
        assert!(out.contains("@keyframes fade"));
        assert!(!out.contains("spin"));
    }
}
