//! Text asset transforms: minification, concatenation and reference rewriting.

pub mod concat;
pub mod html;
pub mod minify;
pub mod rewrite;
