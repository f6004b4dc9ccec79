//! Run configuration loaded from a YAML document.
//!
//! ```yaml
//! logdir: /var/log/tweed
//! outputdir: /var/www/feeds
//! feeds:
//!   - name: example
//!     url: http://example.com/rss.xml
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// One feed to fetch, in the order it appears in the config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedSpec {
    /// Output file stem, `<outputdir>/<name>.xml`.
    pub name: String,
    pub url: String,
}

/// Loaded once per run and never mutated afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "logdir")]
    pub log_directory: PathBuf,
    #[serde(rename = "outputdir")]
    pub output_directory: PathBuf,
    #[serde(default)]
    pub feeds: Vec<FeedSpec>,
}

impl Config {
    #[instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (i, feed) in self.feeds.iter().enumerate() {
            if feed.name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("feed #{} has an empty name", i + 1)));
            }
            if feed.url.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "feed '{}' has an empty url",
                    feed.name
                )));
            }
        }
        Ok(())
    }

    /// Path of the rotating log file.
    pub fn log_file(&self) -> PathBuf {
        self.log_directory.join("tweed.log")
    }
}
