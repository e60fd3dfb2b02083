//! Small shared helpers.

pub mod mime;
pub mod net;
pub mod path;
