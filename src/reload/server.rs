//! Live reload socket acceptor.
//!
//! Accepts TCP connections on its own thread and hands each stream to the
//! `WsActor`, which performs the WebSocket handshake and owns the client.

use std::io::ErrorKind;
use std::net::{IpAddr, TcpListener};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc::Sender;

use crate::actor::messages::WsMsg;
use crate::core::is_shutdown;
use crate::utils::net::{PORT_ATTEMPTS, bind_first_free};

/// Idle wait between non-blocking `accept` calls.
const ACCEPT_POLL: Duration = Duration::from_millis(100);

/// Bind the socket and start accepting. Returns the port actually bound.
pub fn start_ws_server_with_channel(
    interface: IpAddr,
    base_port: u16,
    ws_tx: Sender<WsMsg>,
) -> Result<u16> {
    let (listener, addr) = bind_first_free(
        interface,
        base_port,
        PORT_ATTEMPTS,
        TcpListener::bind,
        |l| l.local_addr().ok().map(|a| a.port()),
    )?;
    listener
        .set_nonblocking(true)
        .context("failed to configure live reload socket")?;

    thread::Builder::new()
        .name("kiln-reload-accept".into())
        .spawn(move || accept_loop(&listener, &ws_tx))
        .context("failed to spawn live reload acceptor")?;

    Ok(addr.port())
}

fn accept_loop(listener: &TcpListener, ws_tx: &Sender<WsMsg>) {
    while !is_shutdown() {
        match listener.accept() {
            Ok((stream, peer)) => {
                crate::debug!("reload"; "connection from {}", peer);
                // The handshake runs blocking in the actor
                let _ = stream.set_nonblocking(false);
                if ws_tx.blocking_send(WsMsg::AddClient(stream)).is_err() {
                    crate::debug!("reload"; "actor gone, stopping acceptor");
                    return;
                }
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => thread::sleep(ACCEPT_POLL),
            Err(e) => {
                crate::log!("reload"; "accept failed: {}", e);
                thread::sleep(ACCEPT_POLL);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, TcpStream};
    use tokio::sync::mpsc;

    #[test]
    fn test_accepted_stream_reaches_actor() {
        let (tx, mut rx) = mpsc::channel(4);
        let port = start_ws_server_with_channel(IpAddr::V4(Ipv4Addr::LOCALHOST), 0, tx).unwrap();
        assert_ne!(port, 0);

        let _client = TcpStream::connect((Ipv4Addr::LOCALHOST, port)).unwrap();
        match rx.blocking_recv() {
            Some(WsMsg::AddClient(_)) => {}
            _ => panic!("expected AddClient"),
        }
    }
}
