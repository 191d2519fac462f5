//! Error types for autorun-core.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a [`RunKey`](crate::run_key::RunKey) adapter.
#[derive(Debug, Error)]
pub enum RunKeyError {
    /// The named value does not exist under the Run key.
    #[error("startup entry '{name}' does not exist in the Run key")]
    NotFound { name: String },

    /// Opening, reading, writing or deleting under the Run key failed
    /// (permission denied, missing key, ...). Keeps the OS error text.
    #[error("failed to {op} the Run key{}: {source}", fmt_name(.name))]
    Access {
        op: &'static str,
        name: Option<String>,
        #[source]
        source: std::io::Error,
    },
}

fn fmt_name(name: &Option<String>) -> String {
    match name {
        Some(n) => format!(" (value '{n}')"),
        None => String::new(),
    }
}

/// Convenience constructor for [`RunKeyError::Access`].
pub(crate) fn access_err(
    op: &'static str,
    name: Option<&str>,
    source: std::io::Error,
) -> RunKeyError {
    RunKeyError::Access {
        op,
        name: name.map(str::to_owned),
        source,
    }
}

/// Errors raised by a [`CacheStore`](crate::cache::CacheStore).
#[derive(Debug, Error)]
pub enum CacheError {
    /// I/O failure on the cache file, with the path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cache file exists but is not a valid cache document.
    #[error("failed to parse cache at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error (save path).
    #[error("cache serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Convenience constructor for [`CacheError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CacheError {
    CacheError::Io {
        path: path.into(),
        source,
    }
}

/// All errors that can arise from reconciler operations.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The program path handed to `add_program` does not exist.
    #[error("program not found: {}", .path.display())]
    ProgramNotFound { path: PathBuf },

    /// No cached startup item (or registry value) with this name.
    #[error("startup entry '{name}' not found")]
    EntryNotFound { name: String },

    /// Rejected user input: empty name/command, a directory instead of a
    /// file, or an item already in the requested state.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    RunKey(#[from] RunKeyError),

    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Coarse classification of a [`ReconcileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    RegistryAccess,
    CacheIo,
    InvalidInput,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "not found"),
            ErrorKind::RegistryAccess => write!(f, "registry access"),
            ErrorKind::CacheIo => write!(f, "cache I/O"),
            ErrorKind::InvalidInput => write!(f, "invalid input"),
        }
    }
}

impl ReconcileError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReconcileError::ProgramNotFound { .. }
            | ReconcileError::EntryNotFound { .. }
            | ReconcileError::RunKey(RunKeyError::NotFound { .. }) => ErrorKind::NotFound,
            ReconcileError::RunKey(RunKeyError::Access { .. }) => ErrorKind::RegistryAccess,
            ReconcileError::Cache(_) => ErrorKind::CacheIo,
            ReconcileError::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }
}
