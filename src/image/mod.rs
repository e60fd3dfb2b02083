//! Image optimisation.
//!
//! # Modules
//!
//! - [`raster`]: JPEG / PNG / GIF re-encoding
//! - [`webp`]: lossless WebP conversion
//! - [`svg`]: SVG cleanup and sprite assembly
//! - [`favicon`]: base favicon set

pub mod favicon;
mod quantize;
pub mod raster;
pub mod svg;
pub mod webp;
