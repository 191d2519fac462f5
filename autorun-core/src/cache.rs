//! JSON cache store.
//!
//! Persists a [`CacheDocument`] at an explicit path (by default
//! `autostart.json` beside the executable, see [`crate::paths`]).
//! Writes use the atomic `.tmp` + rename pattern so a crash mid-save never
//! leaves a truncated cache behind.

use std::path::{Path, PathBuf};

use crate::error::{io_err, CacheError};
use crate::types::CacheDocument;

/// Durable storage for the cache document.
pub trait CacheStore {
    /// Load the document. A missing file is an empty document, not an error.
    fn load(&self) -> Result<CacheDocument, CacheError>;

    /// Replace the stored document.
    fn save(&self, doc: &CacheDocument) -> Result<(), CacheError>;
}

/// [`CacheStore`] backed by a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonCacheStore {
    path: PathBuf,
}

impl JsonCacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }
}

impl CacheStore for JsonCacheStore {
    fn load(&self) -> Result<CacheDocument, CacheError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(CacheDocument::default())
            }
            Err(e) => return Err(io_err(&self.path, e)),
        };
        serde_json::from_str(&contents).map_err(|source| CacheError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, doc: &CacheDocument) -> Result<(), CacheError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
        }

        let mut json = serde_json::to_string_pretty(doc)?;
        json.push('\n');

        let tmp = self.tmp_path();
        std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(&self.path, e));
        }
        tracing::debug!(path = %self.path.display(), items = doc.len(), "cache saved");
        Ok(())
    }
}
