//! Media query grouping.
//!
//! Every top-level `@media` rule with the same query is merged into one
//! (rules kept in source order), and the merged rules are moved after all
//! other rules, sorted mobile-first:
//!
//! 1. `min-width` queries, ascending
//! 2. `max-width` queries, descending
//! 3. everything else, in first-seen order

use std::cmp::Ordering;

use lightningcss::media_query::{
    MediaCondition, MediaFeature, MediaFeatureComparison, MediaFeatureId, MediaFeatureName,
    MediaFeatureValue, MediaList,
};
use lightningcss::rules::media::MediaRule;
use lightningcss::rules::{CssRule, CssRuleList};
use lightningcss::stylesheet::PrinterOptions;
use lightningcss::traits::ToCss;
use lightningcss::values::length::{Length, LengthValue};

use super::prefix::targets;

struct Group<'i> {
    key: String,
    class: QueryClass,
    rule: MediaRule<'i>,
}

/// Merge identical `@media` rules and move them to the end.
pub fn group_media_queries(rules: &mut CssRuleList<'_>) {
    let mut plain = Vec::with_capacity(rules.0.len());
    let mut groups: Vec<Group<'_>> = Vec::new();

    for rule in rules.0.drain(..) {
        let CssRule::Media(media) = rule else {
            plain.push(rule);
            continue;
        };
        let key = query_key(&media.query);
        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.rule.rules.0.extend(media.rules.0),
            None => groups.push(Group {
                key,
                class: classify(&media.query),
                rule: media,
            }),
        }
    }

    // Stable: ties keep first-seen order
    groups.sort_by(|a, b| compare_queries(&a.class, &b.class));

    plain.extend(groups.into_iter().map(|g| CssRule::Media(g.rule)));
    rules.0 = plain;
}

/// The query as it will be printed, so `(min-width: 48em)` and
/// `(width >= 48em)` share a group.
pub fn query_key(query: &MediaList<'_>) -> String {
    query
        .to_css_string(PrinterOptions {
            targets: targets(),
            ..PrinterOptions::default()
        })
        .unwrap_or_default()
}

#[derive(Debug, PartialEq)]
enum QueryClass {
    Min(f32),
    Max(f32),
    Other,
}

fn classify(query: &MediaList<'_>) -> QueryClass {
    query
        .media_queries
        .iter()
        .filter_map(|q| q.condition.as_ref())
        .find_map(width_bound)
        .unwrap_or(QueryClass::Other)
}

/// First `width` bound in a condition, looking through `and`/`or` lists.
fn width_bound(condition: &MediaCondition<'_>) -> Option<QueryClass> {
    match condition {
        MediaCondition::Feature(MediaFeature::Range {
            name: MediaFeatureName::Standard(MediaFeatureId::Width),
            operator,
            value: MediaFeatureValue::Length(length),
        }) => {
            let px = length_px(length)?;
            match operator {
                MediaFeatureComparison::GreaterThan | MediaFeatureComparison::GreaterThanEqual => {
                    Some(QueryClass::Min(px))
                }
                MediaFeatureComparison::LessThan | MediaFeatureComparison::LessThanEqual => {
                    Some(QueryClass::Max(px))
                }
                MediaFeatureComparison::Equal => None,
            }
        }
        MediaCondition::Operation { conditions, .. } => conditions.iter().find_map(width_bound),
        _ => None,
    }
}

/// `em`/`rem` in media queries are relative to the initial 16px.
fn length_px(length: &Length) -> Option<f32> {
    match length {
        Length::Value(LengthValue::Em(v) | LengthValue::Rem(v)) => Some(v * 16.0),
        Length::Value(value) => value.to_px(),
        Length::Calc(_) => None,
    }
}

fn compare_queries(a: &QueryClass, b: &QueryClass) -> Ordering {
    use QueryClass::*;
    match (a, b) {
        (Min(x), Min(y)) => x.total_cmp(y),
        (Max(x), Max(y)) => y.total_cmp(x),
        (Min(_), _) => Ordering::Less,
        (_, Min(_)) => Ordering::Greater,
        (Max(_), Other) => Ordering::Less,
        (Other, Max(_)) => Ordering::Greater,
        (Other, Other) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css::parse_stylesheet;
    use lightningcss::stylesheet::StyleSheet;

    fn print(sheet: &StyleSheet<'_>) -> String {
        sheet.to_css(PrinterOptions::default()).unwrap().code
    }

    fn media_queries(rules: &CssRuleList<'_>) -> Vec<String> {
        rules
            .0
            .iter()
            .filter_map(|r| match r {
                CssRule::Media(m) => Some(query_key(&m.query)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_identical_queries_merged() {
        let css = "@media (min-width: 768px) { .a { top: 0 } }\n.x { top: 1px }\n@media (min-width: 768px) { .b { top: 2px } }";
        let mut sheet = parse_stylesheet(css, "a.css").unwrap();
        group_media_queries(&mut sheet.rules);

        assert_eq!(sheet.rules.0.len(), 2);
        assert!(matches!(sheet.rules.0[0], CssRule::Style(_)));
        let CssRule::Media(media) = &sheet.rules.0[1] else {
            panic!("expected @media last")
        };
        assert_eq!(media.rules.0.len(), 2);
        let out = print(&sheet);
        assert!(out.find(".a").unwrap() < out.find(".b").unwrap());
    }

    #[test]
    fn test_mobile_first_order() {
        let css = "\
@media print { .p { top: 0 } }
@media (max-width: 600px) { .m1 { top: 0 } }
@media (min-width: 1200px) { .l { top: 0 } }
@media (max-width: 900px) { .m2 { top: 0 } }
@media (min-width: 40em) { .s { top: 0 } }
@media screen and (orientation: landscape) { .o { top: 0 } }";
        let mut sheet = parse_stylesheet(css, "a.css").unwrap();
        group_media_queries(&mut sheet.rules);
        assert_eq!(
            media_queries(&sheet.rules),
            vec![
                "(min-width: 40em)",
                "(min-width: 1200px)",
                "(max-width: 900px)",
                "(max-width: 600px)",
                "print",
                "screen and (orientation: landscape)",
            ]
        );
    }

    #[test]
    fn test_range_syntax_shares_group() {
        let css = "@media (min-width: 768px) { .a { top: 0 } }\n@media (width >= 768px) { .b { top: 0 } }";
        let mut sheet = parse_stylesheet(css, "a.css").unwrap();
        group_media_queries(&mut sheet.rules);
        assert_eq!(sheet.rules.0.len(), 1);
    }

    #[test]
    fn test_nested_media_untouched() {
        let css = "@supports (display: grid) { @media (min-width: 1px) { .a { top: 0 } } }";
        let before = print(&parse_stylesheet(css, "a.css").unwrap());
        let mut sheet = parse_stylesheet(css, "a.css").unwrap();
        group_media_queries(&mut sheet.rules);
        assert_eq!(print(&sheet), before);
    }

    #[test]
    fn test_classify() {
        let classes: Vec<QueryClass> = [
            "@media (min-width: 2em) { .a { top: 0 } }",
            "@media screen and (max-width:480px) { .a { top: 0 } }",
            "@media print { .a { top: 0 } }",
        ]
        .into_iter()
        .map(|css| {
            let sheet = parse_stylesheet(css, "a.css").unwrap();
            let CssRule::Media(media) = &sheet.rules.0[0] else {
                panic!("expected @media")
            };
            classify(&media.query)
        })
        .collect();
        assert_eq!(
            classes,
            vec![QueryClass::Min(32.0), QueryClass::Max(480.0), QueryClass::Other]
        );
    }
}
