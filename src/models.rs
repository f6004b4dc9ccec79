//! Data models for feeds as parsed and as re-emitted.
//!
//! - [`ParsedFeed`] / [`ParsedEntry`]: what the source feed supplied, with
//!   optional fields kept optional
//! - [`NormalizedItem`]: an entry after link, id and date backfill
//! - [`OutputFeed`]: the cleaned RSS 2.0 document for one configured feed

use chrono::{DateTime, Utc};

/// Channel-level metadata of a parsed feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedMeta {
    pub title: Option<String>,
    /// Base link used to resolve relative entry links.
    pub link: Option<String>,
    pub description: Option<String>,
}

/// One entry as supplied by the source feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub id: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFeed {
    pub meta: FeedMeta,
    pub entries: Vec<ParsedEntry>,
}

/// An entry ready for output.
///
/// `link` is absolute and `guid` is non-empty. The guid is always emitted
/// with `isPermaLink="false"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub guid: String,
    pub pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFeed {
    pub title: String,
    pub link: String,
    pub description: String,
    pub last_build_date: DateTime<Utc>,
    pub items: Vec<NormalizedItem>,
}

impl OutputFeed {
    /// Assemble the output document, falling back to the configured feed
    /// name and URL when the source omits channel metadata.
    pub fn assemble(
        meta: &FeedMeta,
        feed_name: &str,
        feed_url: &str,
        items: Vec<NormalizedItem>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            title: non_blank(meta.title.as_deref()).unwrap_or(feed_name).to_string(),
            link: non_blank(meta.link.as_deref()).unwrap_or(feed_url).to_string(),
            description: meta.description.clone().unwrap_or_default(),
            last_build_date: now,
            items,
        }
    }
}

pub(crate) fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.trim().is_empty())
}
