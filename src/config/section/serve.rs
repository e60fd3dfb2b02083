//! `[serve]` section configuration.
//!
//! Used when running with `--sync`.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 7000                 # HTTP port number
//! ws_port = 35729             # Live reload WebSocket port
//! tunnel = "development-site" # Tunnel subdomain ("" disables the tunnel)
//! tunnel_command = ["lt", "--port", "{port}", "--subdomain", "{name}"]
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the server accessible from LAN.

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Development server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    /// - `127.0.0.1` (default): localhost only
    /// - `0.0.0.0`: all interfaces (LAN accessible)
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// Live reload WebSocket port.
    pub ws_port: u16,

    /// Tunnel name; empty disables the tunnel.
    pub tunnel: String,

    /// Tunnel command; `{port}` and `{name}` are substituted.
    pub tunnel_command: Vec<String>,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 7000,
            ws_port: 35729,
            tunnel: "development-site".into(),
            tunnel_command: ["lt", "--port", "{port}", "--subdomain", "{name}"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl ServeConfig {
    /// Validate server settings.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.port == 0 {
            diag.error(FieldPath::new("serve.port"), "must not be 0");
        }
        if self.ws_port == 0 {
            diag.error(FieldPath::new("serve.ws_port"), "must not be 0");
        }
        if self.port != 0 && self.port == self.ws_port {
            diag.error_with_hint(
                FieldPath::new("serve.ws_port"),
                format!("clashes with `serve.port` ({})", self.port),
                "the asset server and the live reload socket need separate ports",
            );
        }
        if !self.tunnel.is_empty() && self.tunnel_command.is_empty() {
            diag.error_with_hint(
                FieldPath::new("serve.tunnel_command"),
                "must not be empty when a tunnel name is set",
                "set `tunnel = \"\"` to disable the tunnel",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_serve_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(
            config.serve.interface,
            IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
        );
        assert_eq!(config.serve.port, 7000);
        assert_eq!(config.serve.ws_port, 35729);
        assert_eq!(config.serve.tunnel, "development-site");
        assert_eq!(config.serve.tunnel_command[0], "lt");
    }

    #[test]
    fn test_serve_config_partial_override() {
        let config = test_parse_config("[serve]\nport = 3000\ninterface = \"0.0.0.0\"");
        assert_eq!(config.serve.port, 3000);
        assert_eq!(config.serve.interface, IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        assert_eq!(config.serve.ws_port, 35729);
    }

    #[test]
    fn test_zero_port_rejected() {
        let config = test_parse_config("[serve]\nport = 0");
        let mut diag = ConfigDiagnostics::new();
        config.serve.validate(&mut diag);
        assert_eq!(diag.len(), 1);
    }

    #[test]
    fn test_shared_port_rejected() {
        let config = test_parse_config("[serve]\nport = 4000\nws_port = 4000");
        let mut diag = ConfigDiagnostics::new();
        config.serve.validate(&mut diag);
        assert_eq!(diag.errors()[0].field.as_str(), "serve.ws_port");
    }
}
