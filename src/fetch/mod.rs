//! Network access and feed parsing.
//!
//! The two network operations of a run sit behind traits so the pipeline can
//! be driven by in-memory fakes in tests. The run is single-threaded, so the
//! futures carry no `Send` bound:
//!
//! - [`FeedSource`]: raw bytes of a feed URL
//! - [`HeaderProbe`]: the `Last-Modified` date of an item link
//!
//! [`http::HttpClient`] implements both with `reqwest`; [`parse::parse_feed`]
//! turns fetched bytes into a [`crate::models::ParsedFeed`].

pub mod http;
pub mod links;
pub mod parse;

use crate::error::FeedError;
use chrono::{DateTime, Utc};

pub use http::HttpClient;
pub use parse::parse_feed;

/// Retrieves the raw document behind a feed URL.
#[allow(async_fn_in_trait)]
pub trait FeedSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FeedError>;
}

/// Looks up when an item link was last modified.
///
/// Returns `None` when the date cannot be determined for any reason; the
/// caller decides the fallback.
#[allow(async_fn_in_trait)]
pub trait HeaderProbe {
    async fn last_modified(&self, url: &str) -> Option<DateTime<Utc>>;
}
