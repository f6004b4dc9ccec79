//! Flat on-disk map from [`CacheKey`] to a publish date.
//!
//! The store is a JSON object on disk. It is read once by [`CacheStore::open`]
//! and written back once by [`CacheStore::close`], so a run either persists
//! all of its changes or none of them.

use crate::error::CacheError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Deterministic, reversible encoding of a resolved item link.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn from_link(link: &str) -> Self {
        Self(urlencoding::encode(link).into_owned())
    }

    /// Decode the key back into the link it was built from.
    pub fn link(&self) -> String {
        urlencoding::decode(&self.0)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| self.0.clone())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug)]
pub struct CacheStore {
    path: PathBuf,
    entries: BTreeMap<CacheKey, DateTime<Utc>>,
    dirty: bool,
}

impl CacheStore {
    /// Open the store at `path`. A missing file is an empty store.
    #[instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self, CacheError> {
        let entries = match std::fs::read(path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| CacheError::Corrupt {
                path: path.to_path_buf(),
                source,
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No cache file yet; starting empty");
                BTreeMap::new()
            }
            Err(source) => {
                return Err(CacheError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        info!(entries = entries.len(), "Opened cache");
        Ok(Self {
            path: path.to_path_buf(),
            entries,
            dirty: false,
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.entries.keys()
    }

    pub fn get(&self, key: &CacheKey) -> Option<DateTime<Utc>> {
        self.entries.get(key).copied()
    }

    pub fn insert(&mut self, key: CacheKey, date: DateTime<Utc>) {
        self.entries.insert(key, date);
        self.dirty = true;
    }

    pub fn remove(&mut self, key: &CacheKey) -> Option<DateTime<Utc>> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Persist and release the store.
    ///
    /// The file is replaced through a sibling temp file so a crash mid-write
    /// leaves the previous cache intact. Unchanged stores are not rewritten.
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    pub fn close(self) -> Result<(), CacheError> {
        if !self.dirty {
            debug!("Cache unchanged; nothing to write");
            return Ok(());
        }
        let json = serde_json::to_vec_pretty(&self.entries)?;
        let tmp = temp_path(&self.path);
        let io_err = |source| CacheError::Io {
            path: self.path.clone(),
            source,
        };
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;
        info!(entries = self.entries.len(), "Wrote cache");
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(OsString::from(".tmp"));
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_key_is_reversible() {
        let link = "http://example.com/a b?x=1&y=ü";
        let key = CacheKey::from_link(link);
        assert!(!key.as_str().contains(' '));
        assert_eq!(key.link(), link);
        assert_eq!(key, CacheKey::from_link(link));
    }

    #[test]
    fn test_missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(&dir.path().join("cache.tweed")).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_close_then_reopen_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.tweed");
        let date = Utc.with_ymd_and_hms(2023, 5, 6, 7, 8, 9).unwrap();
        let key = CacheKey::from_link("http://example.com/page1");

        let mut store = CacheStore::open(&path).unwrap();
        store.insert(key.clone(), date);
        store.close().unwrap();

        let store = CacheStore::open(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&key), Some(date));
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_unchanged_store_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.tweed");
        CacheStore::open(&path).unwrap().close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_remove_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.tweed");
        let a = CacheKey::from_link("http://a");
        let b = CacheKey::from_link("http://b");

        let mut store = CacheStore::open(&path).unwrap();
        store.insert(a.clone(), Utc::now());
        store.insert(b.clone(), Utc::now());
        store.close().unwrap();

        let mut store = CacheStore::open(&path).unwrap();
        assert!(store.remove(&a).is_some());
        assert!(store.remove(&a).is_none());
        store.close().unwrap();

        let store = CacheStore::open(&path).unwrap();
        let keys: Vec<_> = store.keys().cloned().collect();
        assert_eq!(keys, vec![b]);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.tweed");
        std::fs::write(&path, b"{not json").unwrap();
        assert!(matches!(
            CacheStore::open(&path).unwrap_err(),
            CacheError::Corrupt { .. }
        ));
    }
}
