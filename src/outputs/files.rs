//! Writing rendered feeds to the output directory.
//!
//! ```text
//! outputdir/
//! ├── <name>.xml        # cleaned feed
//! └── <name>-test.xml   # raw fetched bytes, --test only
//! ```

use crate::error::OutputError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

/// Create the output directory if needed.
///
/// Failure is not fatal here; a directory that really is unusable surfaces
/// as a write error for each feed.
#[instrument(level = "debug", skip_all, fields(dir = %dir.display()))]
pub async fn ensure_output_dir(dir: &Path) {
    if let Err(e) = fs::create_dir_all(dir).await {
        debug!(error = %e, "Output directory cannot be created or already exists");
    }
}

pub fn feed_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.xml"))
}

pub fn raw_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}-test.xml"))
}

#[instrument(level = "debug", skip_all, fields(dir = %dir.display(), %name))]
pub async fn write_feed(dir: &Path, name: &str, xml: &[u8]) -> Result<PathBuf, OutputError> {
    let path = feed_path(dir, name);
    write(&path, xml).await?;
    info!(path = %path.display(), "Wrote");
    Ok(path)
}

/// Keep the unmodified fetched document next to the cleaned one.
#[instrument(level = "debug", skip_all, fields(dir = %dir.display(), %name))]
pub async fn write_raw(dir: &Path, name: &str, raw: &[u8]) -> Result<PathBuf, OutputError> {
    let path = raw_path(dir, name);
    write(&path, raw).await?;
    info!(path = %path.display(), "Original feed written");
    Ok(path)
}

async fn write(path: &Path, bytes: &[u8]) -> Result<(), OutputError> {
    fs::write(path, bytes).await.map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })
}
