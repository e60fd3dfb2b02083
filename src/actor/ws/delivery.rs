use tungstenite::protocol::Message;

use super::WsActor;
use crate::reload::message::HotReloadMessage;

impl WsActor {
    /// Send one message to every client, dropping those that fail.
    ///
    /// Returns how many clients received it.
    pub(super) fn broadcast(&self, message: &HotReloadMessage) -> usize {
        let json = message.to_json();
        let mut clients = self.clients.lock();
        if clients.is_empty() {
            crate::debug!("reload"; "no clients for {}", json);
            return 0;
        }

        let frame = Message::Text(json.into());
        clients.retain_mut(|ws| match ws.send(frame.clone()) {
            Ok(()) => true,
            Err(e) => {
                crate::debug!("reload"; "client dropped: {}", e);
                false
            }
        });
        crate::debug!("reload"; "delivered to {} client(s)", clients.len());
        clients.len()
    }
}
