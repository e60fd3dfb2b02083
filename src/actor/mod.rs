//! Actor System for Watch Mode
//!
//! Message-passing concurrency for the watch loop:
//!
//! ```text
//! FsActor --> PipelineActor --ReloadHandle--> WsActor
//! (watch)       (rebuild)                    (broadcast)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Message types for inter-actor communication
//! - `fs` - File system watcher with debouncing and category routing
//! - `pipeline` - Re-runs categories on the blocking pool
//! - `ws` - WebSocket broadcast
//! - `coordinator` - Wires up and runs actors

pub mod coordinator;
pub mod fs;
pub mod messages;
pub mod pipeline;
pub mod ws;

pub use coordinator::Coordinator;
