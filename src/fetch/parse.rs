use super::links::raw_links;
use crate::error::FeedError;
use crate::models::{non_blank, FeedMeta, ParsedEntry, ParsedFeed};
use feed_rs::model::{Entry, Feed, Link, Text};
use feed_rs::parser;
use tracing::warn;

/// Parse an RSS or Atom document.
///
/// The parser's id generator is replaced with one that produces nothing, so
/// an entry that did not carry an id comes back with `id: None` rather than a
/// synthesized hash. Feed and entry links are taken verbatim from the
/// document rather than from feed-rs, which normalizes them.
pub fn parse_feed(bytes: &[u8]) -> Result<ParsedFeed, FeedError> {
    let parser = parser::Builder::new()
        .id_generator(|_links: &[Link], _title: &Option<Text>, _uri: Option<&str>| String::new())
        .build();
    let feed = parser
        .parse(bytes)
        .map_err(|e| FeedError::Parse(e.to_string()))?;
    let mut parsed = convert(feed);
    apply_raw_links(&mut parsed, bytes);
    Ok(parsed)
}

fn apply_raw_links(parsed: &mut ParsedFeed, bytes: &[u8]) {
    let Some(raw) = raw_links(bytes) else {
        warn!("Cannot read links verbatim; keeping normalized links");
        return;
    };
    parsed.meta.link = raw.feed;
    if raw.entries.len() != parsed.entries.len() {
        warn!(
            scanned = raw.entries.len(),
            parsed = parsed.entries.len(),
            "Entry count mismatch; keeping normalized entry links"
        );
        return;
    }
    for (entry, link) in parsed.entries.iter_mut().zip(raw.entries) {
        entry.link = link;
    }
}

fn convert(feed: Feed) -> ParsedFeed {
    let meta = FeedMeta {
        title: feed.title.map(|t| t.content),
        link: base_link(&feed.links),
        description: feed.description.map(|t| t.content),
    };
    let entries = feed.entries.into_iter().map(convert_entry).collect();
    ParsedFeed { meta, entries }
}

fn convert_entry(entry: Entry) -> ParsedEntry {
    let description = entry
        .summary
        .map(|t| t.content)
        .or_else(|| entry.content.and_then(|c| c.body));
    ParsedEntry {
        title: entry.title.map(|t| t.content),
        link: base_link(&entry.links),
        description,
        id: non_blank(Some(entry.id.as_str())).map(str::to_string),
        date: entry.published.or(entry.updated),
    }
}

/// The alternate (or unqualified) link, falling back to the first one.
fn base_link(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.first())
        .map(|l| l.href.trim().to_string())
        .filter(|href| !href.is_empty())
}
