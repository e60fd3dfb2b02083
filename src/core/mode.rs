//! Mode flags shared by every pipeline.

use std::fmt;

/// Two independent switches supplied on the command line.
///
/// - `dev`: emit source maps
/// - `build`: minify, add `.min` suffixes, optimize markup and images
///
/// Both may be set, and neither (plain pass-through compile).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mode {
    pub dev: bool,
    pub build: bool,
}

impl Mode {
    /// Neither flag set.
    pub const PLAIN: Self = Self {
        dev: false,
        build: false,
    };

    /// `--dev` only.
    pub const DEVELOPMENT: Self = Self {
        dev: true,
        build: false,
    };

    /// `--build` only.
    pub const PRODUCTION: Self = Self {
        dev: false,
        build: true,
    };
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.dev, self.build) {
            (true, true) => write!(f, "dev+build"),
            (true, false) => write!(f, "dev"),
            (false, true) => write!(f, "build"),
            (false, false) => write!(f, "plain"),
        }
    }
}
