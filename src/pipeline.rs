//! One run: every configured feed, in order, then cache pruning.
//!
//! ```text
//! for feed in config.feeds:
//!     fetch -> parse -> normalize entries -> assemble -> write
//! prune untouched cache keys -> close cache
//! ```
//!
//! Feeds and entries are processed strictly one at a time; the cache has a
//! single writer for the whole run.

use crate::cache::{CacheStore, PruneSet};
use crate::cli::Options;
use crate::config::{Config, FeedSpec};
use crate::error::{CacheError, FeedError, OutputError};
use crate::fetch::{parse_feed, FeedSource, HeaderProbe};
use crate::models::OutputFeed;
use crate::normalize::Normalizer;
use crate::outputs::{files, rss};
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

/// Everything a run needs, passed explicitly.
pub struct RunContext<'a, S, P> {
    pub config: &'a Config,
    pub options: Options,
    pub cache: CacheStore,
    pub prune: PruneSet,
    pub source: &'a S,
    pub probe: &'a P,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub feeds_written: usize,
    pub feeds_failed: usize,
    pub items_written: usize,
    pub items_dropped: usize,
    pub keys_pruned: usize,
}

#[derive(Debug, Error)]
enum FeedFailure {
    #[error(transparent)]
    Feed(#[from] FeedError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

#[derive(Debug)]
struct FeedOutcome {
    written: usize,
    dropped: usize,
}

impl<'a, S: FeedSource, P: HeaderProbe> RunContext<'a, S, P> {
    /// Snapshot the cache's current keys as prune candidates.
    pub fn new(config: &'a Config, options: Options, cache: CacheStore, source: &'a S, probe: &'a P) -> Self {
        let prune = PruneSet::snapshot(&cache);
        debug!(candidates = prune.len(), "Cache keys eligible for pruning");
        Self {
            config,
            options,
            cache,
            prune,
            source,
            probe,
        }
    }

    /// Process every feed, prune the cache and persist it.
    ///
    /// Feed-level failures are logged and counted; only a cache that cannot
    /// be written back fails the run.
    #[instrument(level = "info", skip_all, fields(feeds = self.config.feeds.len()))]
    pub async fn run(mut self) -> Result<RunSummary, CacheError> {
        let config = self.config;
        let mut summary = RunSummary::default();

        for feed in &config.feeds {
            match self.process_feed(feed).await {
                Ok(outcome) => {
                    summary.feeds_written += 1;
                    summary.items_written += outcome.written;
                    summary.items_dropped += outcome.dropped;
                }
                Err(e) => {
                    error!(url = %feed.url, error = %e, "Could not grab and parse feed");
                    summary.feeds_failed += 1;
                }
            }
        }

        summary.keys_pruned = self.prune.sweep(&mut self.cache);
        self.cache.close()?;
        info!(?summary, "Run complete");
        Ok(summary)
    }

    #[instrument(level = "info", skip_all, fields(name = %feed.name))]
    async fn process_feed(&mut self, feed: &FeedSpec) -> Result<FeedOutcome, FeedFailure> {
        info!(url = %feed.url, "Grabbing");
        let raw = self.source.fetch(&feed.url).await?;
        let parsed = parse_feed(&raw)?;
        let base = parsed.meta.link.as_deref();

        let mut normalizer = Normalizer::new(&mut self.cache, &mut self.prune, self.probe);
        let mut items = Vec::with_capacity(parsed.entries.len());
        let mut dropped = 0;
        for entry in &parsed.entries {
            debug!(?entry, "Entry");
            match normalizer.normalize(entry, base).await {
                Ok(item) => items.push(item),
                Err(e) => {
                    warn!(error = %e, "Dropping entry");
                    dropped += 1;
                }
            }
        }

        let written = items.len();
        let output = OutputFeed::assemble(&parsed.meta, &feed.name, &feed.url, items, Utc::now());
        let xml = rss::render(&output)?;

        let dir = &self.config.output_directory;
        files::ensure_output_dir(dir).await;
        files::write_feed(dir, &feed.name, &xml).await?;
        if self.options.test {
            files::write_raw(dir, &feed.name, &raw).await?;
        }
        Ok(FeedOutcome { written, dropped })
    }
}
