//! Core types shared across the codebase.

mod mode;
mod state;

pub use mode::Mode;
pub use state::{is_shutdown, register_server, register_shutdown, setup_shutdown_handler};
