//! Actor Message Definitions
//!
//! ```text
//! FsActor --Run--> PipelineActor --Broadcast--> WsActor
//! ```

use crate::paths::CategoryKind;
use crate::reload::message::HotReloadMessage;

// =============================================================================
// PipelineActor Messages
// =============================================================================

/// Messages to Pipeline Actor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineMsg {
    /// Re-run these categories (deduplicated, in table order)
    Run(Vec<CategoryKind>),
    /// Shutdown
    Shutdown,
}

// =============================================================================
// WsActor Messages
// =============================================================================

/// Messages to WebSocket Actor
#[derive(Debug)]
pub enum WsMsg {
    /// Send to every connected client
    Broadcast(HotReloadMessage),
    /// Add client (handshake happens in the actor)
    AddClient(std::net::TcpStream),
    /// Shutdown
    Shutdown,
}
