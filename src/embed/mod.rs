//! Embedded static resources.
//!
//! - `template` - Template types for typed variable injection
//! - `serve` - Dev server assets (livereload.js)
//!
//! ```ignore
//! use embed::serve::{LIVERELOAD_JS, LivereloadVars};
//!
//! let js = LIVERELOAD_JS.render(&LivereloadVars { ws_port: 35729 });
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// URL the dev server answers with the live reload client.
    pub const LIVERELOAD_URL: &str = "/__kiln/livereload.js";

    const WS_PORT_PLACEHOLDER: &str = "__KILN_WS_PORT__";

    /// Variables for livereload.js.
    pub struct LivereloadVars {
        pub ws_port: u16,
    }

    impl TemplateVars for LivereloadVars {
        fn substitutions(&self) -> Vec<(&'static str, String)> {
            vec![(WS_PORT_PLACEHOLDER, self.ws_port.to_string())]
        }
    }

    /// Live reload JavaScript with WebSocket port injection.
    pub const LIVERELOAD_JS: Template<LivereloadVars> =
        Template::new(include_str!(concat!(env!("OUT_DIR"), "/livereload.min.js")));

    /// `<script>` tag loading the client from the dev server.
    pub fn script_tag() -> String {
        format!(r#"<script src="{LIVERELOAD_URL}" defer></script>"#)
    }
}
