//! Live reload.
//!
//! Pipelines signal a [`ReloadHandle`]; the handle forwards messages to the
//! `WsActor`, which broadcasts them to every connected browser.
//!
//! ```text
//! pipeline --ReloadHandle--> WsActor --WebSocket--> browser
//! ```
//!
//! # Modules
//!
//! - `handle` - notification sink passed to every pipeline
//! - `message` - JSON message types (reload, css, connected)
//! - `server` - WebSocket acceptor feeding clients to the `WsActor`

mod handle;
pub mod message;
pub mod server;

pub use handle::ReloadHandle;
