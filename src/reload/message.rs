//! Hot Reload Message Protocol
//!
//! JSON messages sent from the development server to browser clients.
//!
//! ```text
//! {"type":"reload"}
//! {"type":"css","path":"styles/app.css"}
//! {"type":"connected"}
//! ```

use serde::{Deserialize, Serialize};

/// Hot reload message sent over WebSocket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HotReloadMessage {
    /// Full page reload
    Reload,

    /// Re-fetch one stylesheet without reloading the page
    Css {
        /// Stylesheet path relative to the build root, `/`-separated
        path: String,
    },

    /// Sent once after the handshake
    Connected,
}

impl HotReloadMessage {
    /// Create a CSS injection message
    pub fn css(path: impl Into<String>) -> Self {
        Self::Css { path: path.into() }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }
}
