//! Binding and shutdown registration for the asset server.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use anyhow::Result;
use tiny_http::Server;

use crate::core::register_server;
use crate::log;
use crate::utils::net::{PORT_ATTEMPTS, bind_first_free};

/// Bind `interface:base_port`, moving up when the port is taken.
pub fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let (server, addr) = bind_first_free(
        interface,
        base_port,
        PORT_ATTEMPTS,
        Server::http,
        |server| server.server_addr().to_ip().map(|a| a.port()),
    )?;
    if base_port != 0 && addr.port() != base_port {
        log!("serve"; "port {} in use, using {} instead", base_port, addr.port());
    }
    Ok((server, addr))
}

/// Ctrl+C unblocks `incoming_requests` so the request loop returns.
pub fn register_for_shutdown(server: &Arc<Server>) {
    register_server(Arc::clone(server));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[test]
    fn test_bind_retries_next_port() {
        let (_first, addr) = bind_with_retry(LOCALHOST, 0).unwrap();
        assert_ne!(addr.port(), 0);

        let (_second, next) = bind_with_retry(LOCALHOST, addr.port()).unwrap();
        assert_ne!(next.port(), addr.port());
    }
}
