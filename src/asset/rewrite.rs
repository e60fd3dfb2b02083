//! Build-mode reference rewriting for views.
//!
//! Plain substring replacement: `.css` → `.min.css`, then `.js` → `.min.js`.
//! It does not parse markup, so `.json` becomes `.min.json` and an already
//! minified `app.min.css` becomes `app.min.min.css`.

/// Point stylesheet and script references at their `.min` outputs.
pub fn rewrite_min_refs(html: &str) -> String {
    html.replace(".css", ".min.css").replace(".js", ".min.js")
}
