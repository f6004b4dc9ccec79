//! Command-line interface definitions for tweed.
//!
//! This module defines the CLI arguments and options using the `clap` crate.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for tweed.
///
/// # Examples
///
/// ```sh
/// # Use ./config.yaml and ./cache.tweed
/// tweed
///
/// # Explicit paths, keep a raw copy of every fetched feed
/// tweed --config /etc/tweed.yaml --cache /var/lib/tweed/cache.tweed --test
/// ```
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Cli {
    /// Make this program more chatty
    #[arg(short, long)]
    pub verbose: bool,

    /// Download original feed for verification
    #[arg(short, long)]
    pub test: bool,

    /// Configuration file
    #[arg(short, long, default_value = "./config.yaml")]
    pub config: PathBuf,

    /// Cache file
    #[arg(short = 'a', long, default_value = "./cache.tweed")]
    pub cache: PathBuf,

    /// Input files (accepted for compatibility, currently unused)
    pub inputs: Vec<PathBuf>,
}

/// The subset of [`Cli`] that changes how a run behaves.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub verbose: bool,
    pub test: bool,
}

impl From<&Cli> for Options {
    fn from(cli: &Cli) -> Self {
        Self {
            verbose: cli.verbose,
            test: cli.test,
        }
    }
}
