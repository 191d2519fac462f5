use std::collections::{BTreeMap, BTreeSet};
use std::io;

use crate::error::{access_err, RunKeyError};
use crate::run_key::RunKey;

/// In-memory [`RunKey`].
///
/// `fail_writes` / `fail_reads` make the matching operations return
/// [`RunKeyError::Access`] with a permission-denied OS error, so callers can
/// exercise their failure paths. Names added with
/// [`insert_unreadable`](Self::insert_unreadable) are listed but fail to
/// read, like a non-string registry value.
#[derive(Debug, Clone, Default)]
pub struct MemoryRunKey {
    values: BTreeMap<String, String>,
    unreadable: BTreeSet<String>,
    fail_writes: bool,
    fail_reads: bool,
}

impl MemoryRunKey {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values<I, N, V>(values: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        Self {
            values: values
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn set_fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    /// Add a value that is listed but cannot be read as a string.
    pub fn insert_unreadable(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.values.remove(&name);
        self.unreadable.insert(name);
    }

    /// Names added with `insert_unreadable` that are still present.
    pub fn unreadable(&self) -> &BTreeSet<String> {
        &self.unreadable
    }

    /// Current readable contents, for assertions.
    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Mutate the key without going through the port, like another program
    /// editing the registry behind our back.
    pub fn values_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.values
    }

    fn denied() -> io::Error {
        io::Error::new(io::ErrorKind::PermissionDenied, "Access is denied.")
    }
}

impl RunKey for MemoryRunKey {
    fn get(&self, name: &str) -> Result<Option<String>, RunKeyError> {
        if self.fail_reads {
            return Err(access_err("read", Some(name), Self::denied()));
        }
        if self.unreadable.contains(name) {
            let err = io::Error::new(io::ErrorKind::InvalidData, "value is not a string");
            return Err(access_err("read", Some(name), err));
        }
        Ok(self.values.get(name).cloned())
    }

    fn set(&mut self, name: &str, value: &str) -> Result<(), RunKeyError> {
        if self.fail_writes {
            return Err(access_err("write", Some(name), Self::denied()));
        }
        self.unreadable.remove(name);
        self.values.insert(name.to_owned(), value.to_owned());
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<(), RunKeyError> {
        if self.fail_writes {
            return Err(access_err("delete", Some(name), Self::denied()));
        }
        let had_value = self.values.remove(name).is_some();
        let had_unreadable = self.unreadable.remove(name);
        if had_value || had_unreadable {
            return Ok(());
        }
        Err(RunKeyError::NotFound {
            name: name.to_owned(),
        })
    }

    fn list_names(&self) -> Result<Vec<String>, RunKeyError> {
        if self.fail_reads {
            return Err(access_err("list", None, Self::denied()));
        }
        let names: BTreeSet<&String> = self.values.keys().chain(&self.unreadable).collect();
        Ok(names.into_iter().cloned().collect())
    }
}
