//! Publish-date cache shared by every feed in a run.
//!
//! - [`store`]: the persisted key-value map
//! - [`prune`]: tracking of keys not seen this run, swept at the end
//!
//! Only the normalizer and the pruner mutate the store.

pub mod prune;
pub mod store;

pub use prune::PruneSet;
pub use store::{CacheKey, CacheStore};
