use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use regex::Regex;
use tracing::{error, info};

use crate::errors::{ScrapeError, ScrapeResult};

/// Snapshot sink for pages whose selectors matched nothing.
#[cfg_attr(test, mockall::automock)]
pub trait DebugCapture: Send + Sync {
    /// Best effort: implementations log failures instead of returning them.
    fn capture(&self, source_id: &str, timestamp: DateTime<Utc>, raw_document: &str);
}

/// Writes `<dir>/<source id>_<YYYYmmdd_HHMMSS>.html`.
pub struct DebugDirectory {
    dir: PathBuf,
    unsafe_chars: Regex,
}

impl DebugDirectory {
    pub fn new<P: AsRef<Path>>(dir: P) -> ScrapeResult<Self> {
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
            unsafe_chars: Regex::new(r"[^A-Za-z0-9_-]+").map_err(|e| {
                ScrapeError::Config(format!("debug filename pattern: {}", e))
            })?,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn file_path(&self, source_id: &str, timestamp: DateTime<Utc>) -> PathBuf {
        let id = self.unsafe_chars.replace_all(source_id, "_");
        self.dir
            .join(format!("{}_{}.html", id, timestamp.format("%Y%m%d_%H%M%S")))
    }
}

impl DebugCapture for DebugDirectory {
    fn capture(&self, source_id: &str, timestamp: DateTime<Utc>, raw_document: &str) {
        let path = self.file_path(source_id, timestamp);

        let written = fs::create_dir_all(&self.dir).and_then(|_| fs::write(&path, raw_document));
        match written {
            Ok(()) => info!(source = source_id, path = %path.display(), "Saved debug HTML"),
            Err(e) => error!(
                source = source_id,
                path = %path.display(),
                "Error saving debug HTML: {}",
                e
            ),
        }
    }
}

/// Discards captures.
pub struct NoCapture;

impl DebugCapture for NoCapture {
    fn capture(&self, _source_id: &str, _timestamp: DateTime<Utc>, _raw_document: &str) {}
}
