//! Output generation for cleaned feeds.
//!
//! # Submodules
//!
//! - [`rss`]: serializes an `OutputFeed` to an RSS 2.0 document
//! - [`files`]: places documents (and raw copies in test mode) on disk

pub mod files;
pub mod rss;
