//! Markup minification through `minify-html`.
//!
//! Whitespace is collapsed, comments are dropped and inline `<style>` and
//! `<script>` bodies are minified. Closing tags and the `<html>`/`<head>`
//! openers are kept so templates stay readable by other tooling.

use minify_html::Cfg;

/// Minify a whole HTML document.
pub fn minify_markup(source: &str) -> String {
    let mut cfg = Cfg::new();
    cfg.keep_closing_tags = true;
    cfg.keep_html_and_head_opening_tags = true;
    cfg.keep_comments = false;
    cfg.minify_css = true;
    cfg.minify_js = true;
    cfg.remove_bangs = true;
    cfg.remove_processing_instructions = true;
    let minified = minify_html::minify(source.as_bytes(), &cfg);
    String::from_utf8(minified).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}
