use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, error, warn};

use crate::domain::CacheDocument;
use crate::errors::{TrackerError, TrackerResult};
use crate::storage::traits::CacheStore;

/// Cache document kept as a single pretty-printed JSON file.
///
/// Writes overwrite the file in place. A crash mid-write can leave it
/// truncated, which the next `load` treats as an empty cache.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> TrackerResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    fn read(&self) -> TrackerResult<CacheDocument> {
        let content = fs::read_to_string(&self.path)?;
        let document = serde_json::from_str(&content)?;
        Ok(document)
    }

    fn initialize(&self) -> CacheDocument {
        let document = CacheDocument::default();
        if let Err(e) = self.save(&document) {
            error!(path = %self.path.display(), error = %e, "Failed to initialize cache");
        }
        document
    }
}

impl CacheStore for JsonFileStore {
    fn load(&self) -> CacheDocument {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No cache yet, creating one");
            return self.initialize();
        }

        match self.read() {
            Ok(document) => document,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Cache unreadable, starting fresh");
                self.initialize()
            }
        }
    }

    fn save(&self, document: &CacheDocument) -> TrackerResult<()> {
        let json = serde_json::to_string_pretty(document)?;

        self.ensure_parent_dir()
            .and_then(|_| fs::write(&self.path, json).map_err(TrackerError::from))
            .map_err(|e| {
                error!(path = %self.path.display(), error = %e, "Failed to save cache");
                TrackerError::Storage(format!("{}: {}", self.path.display(), e))
            })
    }
}
