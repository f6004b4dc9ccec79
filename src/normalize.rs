//! Per-entry normalization.
//!
//! Rules, in order:
//! 1. A link that does not start with `http://` is joined onto the feed's base link as
//!    `base + "/" + link`. Without a base link the entry is dropped.
//! 2. A missing id becomes the resolved link.
//! 3. A missing date is taken from the cache, then from the link's
//!    `Last-Modified` header, then from the current time. Header lookups are
//!    written back to the cache.
//! 4. The entry's cache key is marked as seen for this run.
//!
//! Steps 1 and 2 (plus the title policy) are the pure [`prepare`]; steps 3
//! and 4 need the cache and network and live on [`Normalizer`].

use crate::cache::{CacheKey, CacheStore, PruneSet};
use crate::error::EntryError;
use crate::fetch::HeaderProbe;
use crate::models::{non_blank, NormalizedItem, ParsedEntry};
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

const ABSOLUTE_PREFIX: &str = "http://";

/// An entry whose identity is settled but whose date may still be missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedEntry {
    pub title: String,
    pub link: String,
    pub description: String,
    pub guid: String,
    pub date: Option<DateTime<Utc>>,
}

pub fn resolve_link(link: &str, base: Option<&str>) -> Result<String, EntryError> {
    if link.starts_with(ABSOLUTE_PREFIX) {
        return Ok(link.to_string());
    }
    match non_blank(base) {
        Some(base) => Ok(format!("{base}/{link}")),
        None => Err(EntryError::UnresolvableLink(link.to_string())),
    }
}

/// Settle link, id and text fields of an entry.
///
/// Entries without a link or a title are rejected.
pub fn prepare(entry: &ParsedEntry, base: Option<&str>) -> Result<PreparedEntry, EntryError> {
    let raw_link = non_blank(entry.link.as_deref()).ok_or(EntryError::MissingLink)?;
    let link = resolve_link(raw_link.trim(), base)?;
    let title = non_blank(entry.title.as_deref())
        .ok_or_else(|| EntryError::MissingTitle(link.clone()))?
        .to_string();
    let guid = non_blank(entry.id.as_deref()).unwrap_or(&link).to_string();

    Ok(PreparedEntry {
        title,
        description: entry.description.clone().unwrap_or_default(),
        guid,
        date: entry.date,
        link,
    })
}

/// Date backfill against the run's cache and a header probe.
pub struct Normalizer<'a, P> {
    cache: &'a mut CacheStore,
    prune: &'a mut PruneSet,
    probe: &'a P,
}

impl<'a, P: HeaderProbe> Normalizer<'a, P> {
    pub fn new(cache: &'a mut CacheStore, prune: &'a mut PruneSet, probe: &'a P) -> Self {
        Self { cache, prune, probe }
    }

    #[instrument(level = "debug", skip_all, fields(link = ?entry.link))]
    pub async fn normalize(
        &mut self,
        entry: &ParsedEntry,
        base: Option<&str>,
    ) -> Result<NormalizedItem, EntryError> {
        let prepared = prepare(entry, base)?;
        let key = CacheKey::from_link(&prepared.link);

        let pub_date = match prepared.date {
            Some(date) => date,
            None => self.backfill_date(&prepared.link, &key).await,
        };
        self.prune.touch(&key);

        Ok(NormalizedItem {
            title: prepared.title,
            link: prepared.link,
            description: prepared.description,
            guid: prepared.guid,
            pub_date,
        })
    }

    async fn backfill_date(&mut self, link: &str, key: &CacheKey) -> DateTime<Utc> {
        if let Some(date) = self.cache.get(key) {
            debug!(%date, "Date from cache");
            return date;
        }
        let date = match self.probe.last_modified(link).await {
            Some(date) => date,
            None => {
                debug!("No usable Last-Modified; using now");
                Utc::now()
            }
        };
        self.cache.insert(key.clone(), date);
        date
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::cell::RefCell;

    /// Probe that answers from a fixed date and records every lookup.
    #[derive(Default)]
    pub struct FakeProbe {
        pub date: Option<DateTime<Utc>>,
        pub calls: RefCell<Vec<String>>,
    }

    impl HeaderProbe for FakeProbe {
        async fn last_modified(&self, url: &str) -> Option<DateTime<Utc>> {
            self.calls.borrow_mut().push(url.to_string());
            self.date
        }
    }

    fn entry(link: &str) -> ParsedEntry {
        ParsedEntry {
            title: Some("Title".into()),
            link: Some(link.into()),
            ..ParsedEntry::default()
        }
    }

    fn header_date() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).unwrap()
    }

    fn empty_cache() -> (tempfile::TempDir, CacheStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(&dir.path().join("cache.tweed")).unwrap();
        (dir, store)
    }

    #[test]
    fn test_absolute_link_is_unchanged() {
        let link = "http://a.example/x";
        assert_eq!(resolve_link(link, Some("http://base")).unwrap(), link);
        assert_eq!(resolve_link(link, None).unwrap(), link);
    }

    #[test]
    fn test_only_http_prefix_counts_as_absolute() {
        assert_eq!(
            resolve_link("https://x.example/a", Some("http://b.example")).unwrap(),
            "http://b.example/https://x.example/a"
        );
        assert_eq!(
            resolve_link("https://x.example/a", None),
            Err(EntryError::UnresolvableLink("https://x.example/a".into()))
        );
    }

    #[test]
    fn test_relative_link_is_joined() {
        assert_eq!(
            resolve_link("page1", Some("http://example.com")).unwrap(),
            "http://example.com/page1"
        );
        assert_eq!(resolve_link("a/b", Some("B")).unwrap(), "B/a/b");
    }

    #[test]
    fn test_relative_link_without_base_is_unresolvable() {
        assert_eq!(
            resolve_link("page1", None),
            Err(EntryError::UnresolvableLink("page1".into()))
        );
        assert!(resolve_link("page1", Some("")).is_err());
    }

    #[test]
    fn test_prepare_backfills_guid() {
        let prepared = prepare(&entry("page1"), Some("http://example.com")).unwrap();
        assert_eq!(prepared.guid, "http://example.com/page1");
        assert_eq!(prepared.description, "");

        let mut with_id = entry("page1");
        with_id.id = Some("urn:x".into());
        assert_eq!(prepare(&with_id, Some("http://example.com")).unwrap().guid, "urn:x");
    }

    #[test]
    fn test_prepare_rejects_missing_title_and_link() {
        let mut untitled = entry("http://example.com/x");
        untitled.title = None;
        assert!(matches!(prepare(&untitled, None), Err(EntryError::MissingTitle(_))));

        let mut linkless = entry("");
        linkless.link = None;
        assert_eq!(prepare(&linkless, Some("http://b")), Err(EntryError::MissingLink));
    }

    #[tokio::test]
    async fn test_explicit_date_skips_cache_and_network() {
        let (_dir, mut cache) = empty_cache();
        let mut prune = PruneSet::snapshot(&cache);
        let probe = FakeProbe::default();
        let date = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut e = entry("http://example.com/a");
        e.date = Some(date);

        let item = Normalizer::new(&mut cache, &mut prune, &probe)
            .normalize(&e, None)
            .await
            .unwrap();
        assert_eq!(item.pub_date, date);
        assert!(probe.calls.borrow().is_empty());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network() {
        let (_dir, mut cache) = empty_cache();
        let cached = Utc.with_ymd_and_hms(2019, 6, 1, 0, 0, 0).unwrap();
        cache.insert(CacheKey::from_link("http://example.com/a"), cached);
        let mut prune = PruneSet::snapshot(&cache);
        let probe = FakeProbe {
            date: Some(header_date()),
            ..FakeProbe::default()
        };

        let item = Normalizer::new(&mut cache, &mut prune, &probe)
            .normalize(&entry("http://example.com/a"), None)
            .await
            .unwrap();
        assert_eq!(item.pub_date, cached);
        assert!(probe.calls.borrow().is_empty());
        assert!(prune.is_empty());
    }

    #[tokio::test]
    async fn test_cache_miss_probes_and_caches() {
        let (_dir, mut cache) = empty_cache();
        let mut prune = PruneSet::snapshot(&cache);
        let probe = FakeProbe {
            date: Some(header_date()),
            ..FakeProbe::default()
        };

        let item = Normalizer::new(&mut cache, &mut prune, &probe)
            .normalize(&entry("page1"), Some("http://example.com"))
            .await
            .unwrap();
        assert_eq!(item.link, "http://example.com/page1");
        assert_eq!(item.guid, item.link);
        assert_eq!(item.pub_date, header_date());
        assert_eq!(*probe.calls.borrow(), vec!["http://example.com/page1".to_string()]);
        assert_eq!(
            cache.get(&CacheKey::from_link("http://example.com/page1")),
            Some(header_date())
        );
    }

    #[tokio::test]
    async fn test_missing_header_falls_back_to_now_and_is_cached() {
        let (_dir, mut cache) = empty_cache();
        let mut prune = PruneSet::snapshot(&cache);
        let probe = FakeProbe::default();
        let before = Utc::now();

        let item = Normalizer::new(&mut cache, &mut prune, &probe)
            .normalize(&entry("http://example.com/a"), None)
            .await
            .unwrap();
        assert!(item.pub_date >= before);
        assert_eq!(cache.get(&CacheKey::from_link("http://example.com/a")), Some(item.pub_date));
    }

    #[tokio::test]
    async fn test_explicit_date_still_marks_key_seen() {
        let (_dir, mut cache) = empty_cache();
        cache.insert(CacheKey::from_link("http://example.com/a"), header_date());
        let mut prune = PruneSet::snapshot(&cache);
        let probe = FakeProbe::default();
        let mut e = entry("http://example.com/a");
        e.date = Some(Utc::now());

        Normalizer::new(&mut cache, &mut prune, &probe)
            .normalize(&e, None)
            .await
            .unwrap();
        assert!(prune.is_empty());
    }
}
