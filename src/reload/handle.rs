//! Process-wide reload notification sink.

use tokio::sync::mpsc;

use super::message::HotReloadMessage;
use crate::actor::messages::WsMsg;

/// Where pipelines send reload notifications.
///
/// Cheap to clone. A disabled handle (no `--sync`, one-shot commands)
/// drops every message.
#[derive(Debug, Clone, Default)]
pub struct ReloadHandle {
    tx: Option<mpsc::Sender<WsMsg>>,
}

impl ReloadHandle {
    /// Handle that ignores every message.
    pub const fn disabled() -> Self {
        Self { tx: None }
    }

    /// Handle feeding the `WsActor`.
    pub const fn new(tx: mpsc::Sender<WsMsg>) -> Self {
        Self { tx: Some(tx) }
    }

    pub const fn is_enabled(&self) -> bool {
        self.tx.is_some()
    }

    /// Ask every client for a full page reload.
    pub fn reload(&self) {
        self.send(HotReloadMessage::Reload);
    }

    /// Ask every client to re-fetch one stylesheet.
    pub fn inject_css(&self, path: &str) {
        self.send(HotReloadMessage::css(path));
    }

    /// Waits for room in the channel, so a batch touching many
    /// stylesheets delivers every injection. Callers run on rayon and
    /// blocking-pool threads, never inside the async runtime.
    fn send(&self, msg: HotReloadMessage) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.blocking_send(WsMsg::Broadcast(msg)).is_err() {
            crate::debug!("reload"; "live reload stopped, message dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_is_noop() {
        let handle = ReloadHandle::disabled();
        assert!(!handle.is_enabled());
        handle.reload();
        handle.inject_css("styles/app.css");
    }

    #[test]
    fn test_forwards_messages() {
        let (tx, mut rx) = mpsc::channel(8);
        let handle = ReloadHandle::new(tx);
        handle.reload();
        handle.inject_css("styles/app.css");

        assert!(matches!(
            rx.try_recv(),
            Ok(WsMsg::Broadcast(HotReloadMessage::Reload))
        ));
        match rx.try_recv() {
            Ok(WsMsg::Broadcast(msg)) => assert_eq!(msg, HotReloadMessage::css("styles/app.css")),
            _ => panic!("expected css message"),
        }
    }

    #[test]
    fn test_full_channel_waits_instead_of_dropping() {
        let (tx, mut rx) = mpsc::channel(1);
        let handle = ReloadHandle::new(tx);
        let sender = std::thread::spawn(move || {
            for i in 0..40 {
                handle.inject_css(&format!("styles/{i}.css"));
            }
        });

        let mut received = 0;
        while let Some(WsMsg::Broadcast(_)) = rx.blocking_recv() {
            received += 1;
        }
        sender.join().unwrap();
        assert_eq!(received, 40);
    }

    #[test]
    fn test_closed_channel_ignored() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        ReloadHandle::new(tx).reload();
    }
}
