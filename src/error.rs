//! Typed failures for each stage of a run.
//!
//! Each error type maps to the unit of work it aborts:
//! - [`ConfigError`]: the whole run
//! - [`FeedError`]: one feed
//! - [`EntryError`]: one entry within a feed
//! - [`CacheError`]: the whole run (the cache is shared by every feed)
//! - [`OutputError`]: one feed

use std::path::PathBuf;
use thiserror::Error;

/// The configuration file could not be read or understood.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// A feed could not be retrieved or parsed; the feed is skipped.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("server answered {0}")]
    Status(reqwest::StatusCode),

    #[error("parse failed: {0}")]
    Parse(String),
}

/// A single entry cannot be normalized; the entry is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("entry has no <link>")]
    MissingLink,

    #[error("malformed <link>: {0}")]
    UnresolvableLink(String),

    #[error("entry has no title: {0}")]
    MissingTitle(String),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cache file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot encode cache: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot serialize feed: {0}")]
    Xml(#[from] std::io::Error),
}
