//! # tweed
//!
//! Fetches a configured list of RSS/Atom feeds, cleans up every entry and
//! writes one RSS 2.0 document per feed.
//!
//! ## Usage
//!
//! ```sh
//! tweed --config ./config.yaml --cache ./cache.tweed
//! ```
//!
//! ## Architecture
//!
//! A single sequential pipeline:
//! 1. **Fetching**: download each feed and parse it (RSS or Atom)
//! 2. **Normalizing**: resolve relative links, backfill ids and publish dates
//!    (feed, then cache, then the link's `Last-Modified` header)
//! 3. **Output**: write `<outputdir>/<name>.xml`
//! 4. **Pruning**: drop cache entries for links not seen in this run

use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, info};

mod cache;
mod cli;
mod config;
mod error;
mod fetch;
mod logging;
mod models;
mod normalize;
mod outputs;
mod pipeline;

use cache::CacheStore;
use cli::{Cli, Options};
use config::Config;
use fetch::HttpClient;
use pipeline::RunContext;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Cli::parse();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Could not open configuration file '{}'", args.config.display());
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let options = Options::from(&args);
    if let Err(e) = logging::init(&config, options.verbose) {
        eprintln!(
            "Could not set up logging in '{}': {e}",
            config.log_directory.display()
        );
        return ExitCode::FAILURE;
    }

    let start_time = std::time::Instant::now();
    info!(version = env!("CARGO_PKG_VERSION"), feeds = config.feeds.len(), "tweed starting up");
    debug!(?args, "Parsed CLI arguments");
    if !args.inputs.is_empty() {
        debug!(inputs = ?args.inputs, "Ignoring positional input files");
    }

    let cache = match CacheStore::open(&args.cache) {
        Ok(cache) => cache,
        Err(e) => {
            error!(error = %e, "Cannot open cache");
            return ExitCode::FAILURE;
        }
    };
    let http = match HttpClient::new() {
        Ok(http) => http,
        Err(e) => {
            error!(error = %e, "Cannot build HTTP client");
            return ExitCode::FAILURE;
        }
    };

    let ctx = RunContext::new(&config, options, cache, &http, &http);
    match ctx.run().await {
        Ok(summary) => {
            let elapsed = start_time.elapsed();
            info!(
                ?elapsed,
                feeds_written = summary.feeds_written,
                feeds_failed = summary.feeds_failed,
                items = summary.items_written,
                "Execution complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Cannot write cache");
            ExitCode::FAILURE
        }
    }
}
