//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::core::Mode;
use crate::paths::CategoryKind;

/// kiln asset pipeline CLI
///
/// Without a subcommand: clean the build root, run every pipeline once,
/// then watch the source tree.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: kiln.toml)
    #[arg(short = 'C', long, global = true, default_value = "kiln.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Development mode: emit source maps
    #[arg(long, global = true)]
    pub dev: bool,

    /// Production mode: minify, add `.min` suffixes, optimize images
    #[arg(long, global = true)]
    pub build: bool,

    /// Serve the build root with live reload and open a tunnel
    #[arg(long, global = true)]
    pub sync: bool,

    /// Print debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Delete everything inside the build root
    Clean,

    /// Run pipelines once without watching
    #[command(visible_alias = "o")]
    Once {
        /// Categories to run (all after a clean when omitted)
        #[arg(value_enum)]
        categories: Vec<CategoryKind>,
    },

    /// Watch the source tree without an initial build
    #[command(visible_alias = "w")]
    Watch,
}

impl Cli {
    /// Mode flags read by every pipeline.
    pub const fn mode(&self) -> Mode {
        Mode {
            dev: self.dev,
            build: self.build,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_task() {
        let cli = Cli::parse_from(["kiln"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.mode(), Mode::default());
        assert!(!cli.sync);
        assert_eq!(cli.config, PathBuf::from("kiln.toml"));
    }

    #[test]
    fn test_mode_flags() {
        let cli = Cli::parse_from(["kiln", "--dev", "--build", "--sync"]);
        assert_eq!(cli.mode(), Mode { dev: true, build: true });
        assert!(cli.sync);
    }

    #[test]
    fn test_once_with_categories() {
        let cli = Cli::parse_from(["kiln", "once", "styles", "imagewebp", "--build"]);
        match cli.command {
            Some(Commands::Once { categories }) => {
                assert_eq!(categories, vec![CategoryKind::Styles, CategoryKind::Imagewebp]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(cli.build);
    }

    #[test]
    fn test_custom_config() {
        let cli = Cli::parse_from(["kiln", "-C", "site/kiln.toml", "clean"]);
        assert_eq!(cli.config, PathBuf::from("site/kiln.toml"));
        assert!(matches!(cli.command, Some(Commands::Clean)));
    }
}
