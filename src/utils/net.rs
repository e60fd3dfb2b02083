//! Port selection shared by the asset server and the live reload socket.

use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};

use anyhow::{Result, bail};

/// Ports tried after the configured one is taken.
pub const PORT_ATTEMPTS: u16 = 10;

/// Bind `base_port`, or the next free port among `attempts` consecutive ones.
///
/// `bind` opens the listener; `port_of` reads back the bound port, which
/// differs from the requested one when asking for port 0.
pub fn bind_first_free<T, E: Display>(
    interface: IpAddr,
    base_port: u16,
    attempts: u16,
    mut bind: impl FnMut(SocketAddr) -> Result<T, E>,
    port_of: impl Fn(&T) -> Option<u16>,
) -> Result<(T, SocketAddr)> {
    let mut last_error = String::new();
    for offset in 0..attempts.max(1) {
        let Some(port) = base_port.checked_add(offset) else {
            break;
        };
        match bind(SocketAddr::new(interface, port)) {
            Ok(listener) => {
                let bound = port_of(&listener).unwrap_or(port);
                return Ok((listener, SocketAddr::new(interface, bound)));
            }
            Err(e) => last_error = e.to_string(),
        }
    }
    bail!(
        "no free port in {}-{} on {interface}: {last_error}",
        base_port,
        base_port.saturating_add(attempts.max(1) - 1)
    )
}
