//! Configuration section definitions, one file per `kiln.toml` table.

mod favicons;
mod images;
mod paths;
mod serve;
mod styles;
mod watch;

pub use favicons::FaviconsConfig;
pub use images::{GifConfig, ImagesConfig, JpegConfig, PngConfig, SvgConfig, SvgPlugin, WebpConfig};
pub use paths::PathsConfig;
pub use serve::ServeConfig;
pub use styles::{RemConfig, StylesConfig};
pub use watch::WatchConfig;
