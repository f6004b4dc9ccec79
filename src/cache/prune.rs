use super::store::{CacheKey, CacheStore};
use std::collections::HashSet;
use tracing::{debug, info};

/// Keys that existed when the run started and have not been seen since.
///
/// Whatever is left at the end of the run is swept from the store, so the
/// cache only ever holds links present in the most recent run.
#[derive(Debug, Default)]
pub struct PruneSet {
    candidates: HashSet<CacheKey>,
}

impl PruneSet {
    pub fn snapshot(store: &CacheStore) -> Self {
        Self {
            candidates: store.keys().cloned().collect(),
        }
    }

    /// Mark a key as seen in this run.
    pub fn touch(&mut self, key: &CacheKey) {
        self.candidates.remove(key);
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Delete every untouched key from `store`. Returns the number deleted.
    pub fn sweep(self, store: &mut CacheStore) -> usize {
        let mut deleted = 0;
        for key in self.candidates {
            if store.remove(&key).is_some() {
                debug!(link = %key.link(), "Deleting from cache");
                deleted += 1;
            }
        }
        info!(deleted, remaining = store.len(), "Pruned cache");
        deleted
    }
}
