//! Minification for JS and CSS.
//!
//! Uses oxc for JavaScript and lightningcss for CSS.

use anyhow::{Result, anyhow};
use lightningcss::stylesheet::{
    MinifyOptions, ParserOptions, PrinterOptions, StyleAttribute, StyleSheet,
};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

/// Minify and mangle classic (non-module) JavaScript.
///
/// Parsed as a script, so top-level declarations are globals: they are
/// neither dropped as unused nor renamed, since other page scripts and
/// inline handlers reach them by name.
pub fn minify_js(source: &str) -> Result<String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::script()).parse();
    if let Some(error) = ret.errors.first() {
        return Err(anyhow!("{error}"));
    }
    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions {
            top_level: Some(false),
            ..MangleOptions::default()
        }),
        compress: Some(CompressOptions::smallest()),
    };
    let ret = Minifier::new(options).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(ret.scoping)
        .build(&program)
        .code;
    Ok(code)
}

/// Minify a CSS fragment, e.g. the `<style>` body of an SVG.
pub fn minify_css(source: &str) -> Result<String> {
    let stylesheet =
        StyleSheet::parse(source, ParserOptions::default()).map_err(|e| anyhow!("{e}"))?;
    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("{e}"))?;
    Ok(result.code)
}

/// Minify a `style` attribute's declaration list.
pub fn minify_declarations(source: &str) -> Result<String> {
    let mut declarations =
        StyleAttribute::parse(source, ParserOptions::default()).map_err(|e| anyhow!("{e}"))?;
    declarations.minify(MinifyOptions::default());
    let result = declarations
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("{e}"))?;
    Ok(result.code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_js_strips_whitespace_and_comments() {
        let source = "// greet\nfunction greet(name) {\n  var message = 'hi ' + name;\n  return message;\n}\n";
        let out = minify_js(source).unwrap();
        assert!(!out.contains("// greet"));
        assert!(out.contains("greet"));
        assert!(out.len() < source.len());
    }

    #[test]
    fn test_minify_js_keeps_globals() {
        let out = minify_js("var counter = 0;\nfunction bump() { counter += 1; }\n").unwrap();
        assert!(out.contains("counter"));
        assert!(out.contains("bump"));
    }

    #[test]
    fn test_minify_js_keeps_unreferenced_functions() {
        let out = minify_js("function openMenu(el) {\n  el.classList.add('open');\n}\n").unwrap();
        assert!(out.contains("function openMenu("), "{out}");
        assert!(out.contains("classList"));
    }

    #[test]
    fn test_minify_js_mangles_locals_only() {
        let out = minify_js("function total(items) { var runningSum = 0; for (var i of items) runningSum += i; return runningSum; }").unwrap();
        assert!(out.contains("total"));
        assert!(!out.contains("runningSum"), "{out}");
    }

    #[test]
    fn test_minify_js_syntax_error() {
        assert!(minify_js("function (").is_err());
    }

    #[test]
    fn test_minify_css() {
        let out = minify_css(".a {\n  color: #ff0000;\n}\n").unwrap();
        assert_eq!(out, ".a{color:red}");
    }

    #[test]
    fn test_minify_declarations() {
        let out = minify_declarations("fill : red ; stroke-width: 2px;").unwrap();
        assert_eq!(out, "fill:red;stroke-width:2px");
    }
}
