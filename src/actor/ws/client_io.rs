use std::io::ErrorKind;
use std::net::TcpStream;
use std::time::Duration;

use tungstenite::{Error, WebSocket, protocol::Message};

use crate::core::is_shutdown;
use crate::reload::message::HotReloadMessage;

use super::{Clients, WsActor};

/// How often idle clients are read for close frames.
const READ_POLL: Duration = Duration::from_millis(100);

impl WsActor {
    /// Handshake, greet with `connected`, then keep the client for broadcasts.
    pub(super) fn add_client(&self, stream: TcpStream) {
        // Handshake needs a blocking stream
        let mut ws = match tungstenite::accept(stream) {
            Ok(ws) => ws,
            Err(e) => {
                crate::log!("reload"; "handshake failed: {}", e);
                return;
            }
        };

        let greeting = Message::Text(HotReloadMessage::Connected.to_json().into());
        if let Err(e) = ws.send(greeting) {
            crate::debug!("reload"; "client left before greeting: {}", e);
            return;
        }
        let _ = ws.get_ref().set_nonblocking(true);

        let mut clients = self.clients.lock();
        clients.push(ws);
        crate::debug!("reload"; "{} client(s) connected", clients.len());
    }

    /// Drop clients that closed. Browsers never send anything else, but
    /// reading is what answers their pings.
    pub(super) fn client_reader_loop(clients: Clients) {
        while !is_shutdown() {
            std::thread::sleep(READ_POLL);
            clients.lock().retain_mut(still_open);
        }
    }
}

fn still_open(ws: &mut WebSocket<TcpStream>) -> bool {
    match ws.read() {
        Ok(Message::Close(_)) => false,
        Ok(_) => true,
        Err(Error::Io(e)) if e.kind() == ErrorKind::WouldBlock => true,
        Err(e) => {
            crate::debug!("reload"; "client dropped: {}", e);
            false
        }
    }
}
