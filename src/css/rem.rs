//! px → rem conversion.
//!
//! Converts px lengths in the values of configured properties, and in
//! `@media` parameters when enabled. Strings, `url()` and `var()` are left
//! alone, as are values below `min_px`.
//!
//! Property list entries:
//! - `font-size`: exact match
//! - `*`: every property
//! - `*pos*`, `font*`, `*spacing`: contains / prefix / suffix
//! - `!margin`: exclude (wildcards allowed after `!`)

use std::convert::Infallible;

use lightningcss::media_query::MediaQuery;
use lightningcss::properties::Property;
use lightningcss::properties::custom::Variable;
use lightningcss::stylesheet::StyleSheet;
use lightningcss::values::length::LengthValue;
use lightningcss::visit_types;
use lightningcss::visitor::{Visit, VisitTypes, Visitor};

use crate::config::RemConfig;

/// Rewrite px values across a stylesheet in place.
pub fn convert(stylesheet: &mut StyleSheet<'_>, config: &RemConfig) {
    let mut converter = Converter {
        config,
        active: false,
    };
    let Ok(()) = stylesheet.visit(&mut converter);
}

struct Converter<'a> {
    config: &'a RemConfig,
    /// Inside a matching property or a media query.
    active: bool,
}

impl Converter<'_> {
    fn convert_px(&self, px: f32) -> Option<f32> {
        if f64::from(px.abs()) < self.config.min_px {
            return None;
        }
        let rem = to_fixed(f64::from(px) / self.config.root_value, self.config.precision);
        Some(rem as f32)
    }
}

impl<'i> Visitor<'i> for Converter<'_> {
    type Error = Infallible;

    fn visit_types(&self) -> VisitTypes {
        visit_types!(PROPERTIES | LENGTHS | MEDIA_QUERIES | VARIABLES)
    }

    fn visit_property(&mut self, property: &mut Property<'i>) -> Result<(), Self::Error> {
        let id = property.property_id();
        if !prop_matches(&self.config.props, id.name()) {
            return Ok(());
        }
        self.active = true;
        let result = property.visit_children(self);
        self.active = false;
        result
    }

    fn visit_media_query(&mut self, query: &mut MediaQuery<'i>) -> Result<(), Self::Error> {
        if !self.config.media_query {
            return Ok(());
        }
        self.active = true;
        let result = query.visit_children(self);
        self.active = false;
        result
    }

    fn visit_variable(&mut self, _var: &mut Variable<'i>) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_length(&mut self, length: &mut LengthValue) -> Result<(), Self::Error> {
        if self.active
            && let LengthValue::Px(px) = *length
            && let Some(rem) = self.convert_px(px)
        {
            *length = LengthValue::Rem(rem);
        }
        Ok(())
    }
}

/// Round to `precision` decimals the way the reference px→rem tool does.
fn to_fixed(number: f64, precision: u32) -> f64 {
    let multiplier = 10f64.powi(precision as i32 + 1);
    let whole = (number * multiplier).floor();
    (whole / 10.0).round() * 10.0 / multiplier
}

fn prop_matches(list: &[String], property: &str) -> bool {
    let property = property.to_ascii_lowercase();
    let excluded = list
        .iter()
        .filter_map(|p| p.strip_prefix('!'))
        .any(|p| wildcard_match(p, &property));
    if excluded {
        return false;
    }
    list.iter()
        .filter(|p| !p.starts_with('!'))
        .any(|p| wildcard_match(p, &property))
}

fn wildcard_match(pattern: &str, property: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    match (pattern.strip_prefix('*'), pattern.strip_suffix('*')) {
        (Some(rest), Some(_)) => {
            let inner = rest.strip_suffix('*').unwrap_or(rest);
            property.contains(inner)
        }
        (Some(suffix), None) => property.ends_with(suffix),
        (None, Some(prefix)) => property.starts_with(prefix),
        (None, None) => property == pattern,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parse_stylesheet;
    use lightningcss::stylesheet::PrinterOptions;

    fn run(css: &str, config: &RemConfig) -> String {
        let mut sheet = parse_stylesheet(css, "a.css").unwrap();
        convert(&mut sheet, config);
        sheet.to_css(PrinterOptions::default()).unwrap().code
    }

    #[test]
    fn test_default_props() {
        let out = run(
            ".a { font-size: 14px; margin: 16px; line-height: 24px }",
            &RemConfig::default(),
        );
        assert!(out.contains("font-size: .875rem"), "{out}");
        assert!(out.contains("margin: 16px"));
        assert!(out.contains("line-height: 1.5rem"));
    }

    #[test]
    fn test_media_query_params() {
        let out = run(
            "@media (min-width: 768px) { .a { font-size: 32px } }",
            &RemConfig::default(),
        );
        assert!(out.contains("48rem"), "{out}");
        assert!(out.contains("font-size: 2rem"));

        let config = RemConfig {
            media_query: false,
            ..RemConfig::default()
        };
        let out = run("@media (min-width: 768px) { .a { top: 0 } }", &config);
        assert!(out.contains("768px"));
    }

    #[test]
    fn test_skips_strings_urls_and_vars() {
        let config = RemConfig {
            props: vec!["*".into()],
            ..RemConfig::default()
        };
        let out = run(
            ".a { background: url(img-16px.png); content: \"12px\"; width: var(--w, 8px); top: 8px }",
            &config,
        );
        assert!(out.contains("img-16px.png"));
        assert!(out.contains("\"12px\""));
        assert!(out.contains("var(--w, 8px)"), "{out}");
        assert!(out.contains("top: .5rem"));
    }

    #[test]
    fn test_min_px_and_zero() {
        let config = RemConfig {
            min_px: 2.0,
            ..RemConfig::default()
        };
        let out = run(".a { font-size: 1px; letter-spacing: 0px }", &config);
        assert!(out.contains("font-size: 1px"));
        assert!(!out.contains("rem"));

        let out = run(".a { letter-spacing: 0px }", &RemConfig::default());
        assert!(out.contains("letter-spacing: 0;"), "{out}");
    }

    #[test]
    fn test_excluded_property_untouched() {
        let config = RemConfig {
            props: vec!["*".into(), "!border*".into()],
            ..RemConfig::default()
        };
        let out = run(".a { border-width: 2px; padding: 8px }", &config);
        assert!(out.contains("border-width: 2px"));
        assert!(out.contains("padding: .5rem"));
    }

    #[test]
    fn test_to_fixed() {
        assert_eq!(to_fixed(14.0 / 16.0, 5), 0.875);
        assert_eq!(to_fixed(1.0 / 3.0, 5), 0.33333);
        assert_eq!(to_fixed(2.0 / 3.0, 2), 0.67);
    }

    #[test]
    fn test_prop_list_wildcards() {
        let list: Vec<String> = ["*position*", "font*", "*spacing", "!font-weight"]
            .into_iter()
            .map(String::from)
            .collect();
        assert!(prop_matches(&list, "background-position-x"));
        assert!(prop_matches(&list, "font-size"));
        assert!(prop_matches(&list, "letter-spacing"));
        assert!(!prop_matches(&list, "font-weight"));
        assert!(!prop_matches(&list, "margin"));
    }
}
