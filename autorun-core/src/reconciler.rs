//! Keeps the cache document consistent with the live Run key.
//!
//! # Ordering
//!
//! Every mutating operation touches the Run key first and the cache second.
//! If the run-key step fails the cache is never written, and a crash between
//! the two steps leaves the registry as ground truth for the next
//! [`Reconciler::sync`].
//!
//! # Cache recovery
//!
//! A cache that cannot be read or parsed is treated as empty (and logged);
//! the next successful save replaces it.

use std::path::{Path, PathBuf};

use crate::cache::CacheStore;
use crate::error::{ReconcileError, RunKeyError};
use crate::run_key::RunKey;
use crate::types::{CacheDocument, ItemFilter, RunKeySnapshot, StartupItem};

// ---------------------------------------------------------------------------
// Sync report
// ---------------------------------------------------------------------------

/// What a sync pass changed in the cache document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Names found in the Run key but not in the cache.
    pub added: Vec<String>,
    /// Cached, previously disabled names now present in the Run key.
    pub enabled: Vec<String>,
    /// Enabled names whose registry command differs from the cached one.
    pub updated: Vec<String>,
    /// Cached names no longer present in the Run key.
    pub disabled: Vec<String>,
    /// Names that appeared more than once in the cache; later copies dropped.
    pub deduplicated: Vec<String>,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.enabled.is_empty()
            && self.updated.is_empty()
            && self.disabled.is_empty()
            && self.deduplicated.is_empty()
    }
}

/// Bring `doc` in line with `snapshot`.
///
/// 1. Disable pass: cached items missing from the snapshot become disabled;
///    they are kept with their last known command.
/// 2. Enable pass: every snapshot entry ends up cached, enabled, with the
///    registry value as its command. New names are appended in name order.
///
/// The enable pass runs last so the registry always has the final word.
/// Repeated names in the cache are collapsed to their first occurrence
/// before either pass runs.
pub fn reconcile(doc: &mut CacheDocument, snapshot: &RunKeySnapshot) -> SyncReport {
    let mut report = SyncReport {
        deduplicated: doc.dedup_by_name(),
        ..SyncReport::default()
    };
    if !report.deduplicated.is_empty() {
        tracing::warn!(names = ?report.deduplicated, "dropped duplicate cache entries");
    }

    for item in doc.items.iter_mut() {
        if item.enabled && !snapshot.contains_key(&item.name) {
            item.enabled = false;
            report.disabled.push(item.name.clone());
        }
    }

    for (name, value) in snapshot {
        match doc.get_mut(name) {
            Some(item) => {
                if !item.enabled {
                    report.enabled.push(name.clone());
                } else if item.command != *value {
                    report.updated.push(name.clone());
                }
                item.command = value.clone();
                item.enabled = true;
            }
            None => {
                doc.items.push(StartupItem::new(name.as_str(), value.as_str(), true));
                report.added.push(name.clone());
            }
        }
    }

    report
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Default entry name for a program: its file name without extension.
pub fn program_name(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
}

/// Quote an absolute path so embedded spaces survive the Run key.
pub fn quote_path(path: &Path) -> String {
    format!("\"{}\"", path.display())
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn same_path(a: &Path, b: &Path) -> bool {
    if cfg!(windows) {
        a.as_os_str()
            .to_string_lossy()
            .eq_ignore_ascii_case(&b.as_os_str().to_string_lossy())
    } else {
        a == b
    }
}

fn require_non_empty(what: &str, value: &str) -> Result<(), ReconcileError> {
    if value.trim().is_empty() {
        return Err(ReconcileError::InvalidInput(format!("{what} must not be empty")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Reconciler
// ---------------------------------------------------------------------------

/// Owns a Run key adapter and a cache store and keeps them consistent.
pub struct Reconciler<K, S> {
    run_key: K,
    store: S,
}

impl<K: RunKey, S: CacheStore> Reconciler<K, S> {
    pub fn new(run_key: K, store: S) -> Self {
        Self { run_key, store }
    }

    pub fn run_key(&self) -> &K {
        &self.run_key
    }

    pub fn run_key_mut(&mut self) -> &mut K {
        &mut self.run_key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the cache, falling back to an empty document on any failure.
    ///
    /// The flag is `false` when the fallback was used.
    fn load_cache(&self) -> (CacheDocument, bool) {
        match self.store.load() {
            Ok(doc) => (doc, true),
            Err(err) => {
                tracing::warn!(error = %err, "cache unreadable, starting from an empty cache");
                (CacheDocument::default(), false)
            }
        }
    }

    /// Reconcile the cache with the live Run key and persist it.
    ///
    /// A Run key read failure aborts the pass with nothing written.
    pub fn sync(&mut self) -> Result<SyncReport, ReconcileError> {
        let snapshot = self.run_key.snapshot()?;
        let (mut doc, clean) = self.load_cache();
        let report = reconcile(&mut doc, &snapshot);
        if !report.is_empty() || !clean {
            self.store.save(&doc)?;
        }
        tracing::info!(
            added = report.added.len(),
            enabled = report.enabled.len(),
            updated = report.updated.len(),
            disabled = report.disabled.len(),
            deduplicated = report.deduplicated.len(),
            "cache synced with Run key"
        );
        Ok(report)
    }

    /// Register an executable under `name` as `"<absolute path>"`.
    ///
    /// Overwrites an existing value of the same name.
    pub fn add_program(
        &mut self,
        path: &Path,
        name: &str,
    ) -> Result<StartupItem, ReconcileError> {
        require_non_empty("name", name)?;
        let path = absolute(path);
        let meta = match std::fs::metadata(&path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ReconcileError::ProgramNotFound { path })
            }
            Err(e) => {
                return Err(ReconcileError::InvalidInput(format!(
                    "cannot access {}: {e}",
                    path.display()
                )))
            }
        };
        if !meta.is_file() {
            return Err(ReconcileError::InvalidInput(format!(
                "{} is not a file",
                path.display()
            )));
        }
        self.write_enabled(name, &quote_path(&path))
    }

    /// Register an arbitrary command line under `name`, verbatim.
    pub fn add_command(
        &mut self,
        command: &str,
        name: &str,
    ) -> Result<StartupItem, ReconcileError> {
        require_non_empty("name", name)?;
        require_non_empty("command", command)?;
        self.write_enabled(name, command)
    }

    fn write_enabled(&mut self, name: &str, command: &str) -> Result<StartupItem, ReconcileError> {
        self.run_key.set(name, command)?;
        let (mut doc, _) = self.load_cache();
        let item = doc.upsert(name, command, true).clone();
        self.store.save(&doc)?;
        tracing::info!(name = %name, command = %command, "startup entry written");
        Ok(item)
    }

    /// Delete the Run key value and forget the item entirely.
    pub fn remove_program(&mut self, name: &str) -> Result<(), ReconcileError> {
        self.run_key.delete(name).map_err(|err| match err {
            RunKeyError::NotFound { name } => ReconcileError::EntryNotFound { name },
            other => other.into(),
        })?;
        let (mut doc, _) = self.load_cache();
        doc.remove(name);
        self.store.save(&doc)?;
        tracing::info!(name = %name, "startup entry removed");
        Ok(())
    }

    /// Restore a soft-disabled item's command to the Run key.
    pub fn enable(&mut self, name: &str) -> Result<StartupItem, ReconcileError> {
        let (mut doc, _) = self.load_cache();
        let item = doc.get(name).ok_or_else(|| ReconcileError::EntryNotFound {
            name: name.to_owned(),
        })?;
        if item.enabled {
            return Err(ReconcileError::InvalidInput(format!(
                "'{name}' is already enabled"
            )));
        }
        let command = item.command.clone();

        self.run_key.set(name, &command)?;
        let item = doc.upsert(name, &command, true).clone();
        self.store.save(&doc)?;
        tracing::info!(name = %name, "startup entry enabled");
        Ok(item)
    }

    /// Remove an item's Run key value but remember its command.
    ///
    /// A value already missing from the Run key is not an error.
    pub fn disable(&mut self, name: &str) -> Result<StartupItem, ReconcileError> {
        let (mut doc, _) = self.load_cache();
        let item = doc.get(name).ok_or_else(|| ReconcileError::EntryNotFound {
            name: name.to_owned(),
        })?;
        if !item.enabled {
            return Err(ReconcileError::InvalidInput(format!(
                "'{name}' is already disabled"
            )));
        }
        let command = item.command.clone();

        match self.run_key.delete(name) {
            Ok(()) => {}
            Err(RunKeyError::NotFound { .. }) => {
                tracing::debug!(name = %name, "value already absent from Run key");
            }
            Err(err) => return Err(err.into()),
        }
        let item = doc.upsert(name, &command, false).clone();
        self.store.save(&doc)?;
        tracing::info!(name = %name, "startup entry disabled");
        Ok(item)
    }

    /// Whether the Run key already points `name` at `path`.
    ///
    /// Surrounding quotes are stripped and both sides made absolute before
    /// comparing. An absent value is simply "not registered".
    pub fn is_registered(&self, path: &Path, name: &str) -> Result<bool, ReconcileError> {
        let Some(value) = self.run_key.get(name)? else {
            return Ok(false);
        };
        let registered = absolute(Path::new(value.trim_matches('"')));
        Ok(same_path(&absolute(path), &registered))
    }

    /// Whether any Run key value called `name` exists, readable or not.
    pub fn contains(&self, name: &str) -> Result<bool, ReconcileError> {
        Ok(self.run_key.list_names()?.iter().any(|n| n == name))
    }

    /// Cached items sorted by name.
    pub fn items(&self, filter: ItemFilter) -> Vec<StartupItem> {
        self.load_cache().0.sorted_by_name(filter)
    }

    /// The live Run key contents.
    pub fn registered(&self) -> Result<RunKeySnapshot, ReconcileError> {
        Ok(self.run_key.snapshot()?)
    }

    /// Every Run key value name sorted, with `None` for values that cannot be
    /// read as a string. Only a failure to list the key is an error.
    pub fn registered_entries(&self) -> Result<Vec<(String, Option<String>)>, ReconcileError> {
        let mut names = self.run_key.list_names()?;
        names.sort();
        Ok(names
            .into_iter()
            .filter_map(|name| match self.run_key.get(&name) {
                Ok(Some(value)) => Some((name, Some(value))),
                Ok(None) => None,
                Err(err) => {
                    tracing::debug!(name = %name, error = %err, "listing unreadable value");
                    Some((name, None))
                }
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
