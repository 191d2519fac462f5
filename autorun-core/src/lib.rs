//! autorun core library: startup cache, Run key port, reconciliation.
//!
//! Public API surface:
//! - [`types`]: [`StartupItem`], [`CacheDocument`], [`RunKeySnapshot`]
//! - [`error`]: [`ReconcileError`], [`RunKeyError`], [`CacheError`]
//! - [`run_key`]: the [`RunKey`] port and its adapters
//! - [`cache`]: the [`CacheStore`] port and [`JsonCacheStore`]
//! - [`reconciler`]: [`Reconciler`] and the pure [`reconcile`] pass
//! - [`paths`]: Run key path and cache file location

pub mod cache;
pub mod error;
pub mod paths;
pub mod reconciler;
pub mod run_key;
pub mod types;

pub use cache::{CacheStore, JsonCacheStore};
pub use error::{CacheError, ErrorKind, ReconcileError, RunKeyError};
pub use reconciler::{program_name, quote_path, reconcile, Reconciler, SyncReport};
pub use run_key::{MemoryRunKey, RunKey};
#[cfg(windows)]
pub use run_key::WindowsRunKey;
pub use types::{CacheDocument, ItemFilter, RunKeySnapshot, StartupItem};
