use std::io;

use winreg::enums::{HKEY_CURRENT_USER, KEY_READ};
use winreg::types::FromRegValue;
use winreg::RegKey;

use crate::error::{access_err, RunKeyError};
use crate::paths::RUN_KEY_PATH;
use crate::run_key::RunKey;
use crate::types::RunKeySnapshot;

/// [`RunKey`] over `HKEY_CURRENT_USER\<path>`.
///
/// The subkey is opened per operation: read-only for queries, via
/// `create_subkey` for writes so a missing key is created on first use.
pub struct WindowsRunKey {
    hkcu: RegKey,
    path: String,
}

impl WindowsRunKey {
    /// The per-user Run key.
    pub fn open() -> Self {
        Self {
            hkcu: RegKey::predef(HKEY_CURRENT_USER),
            path: RUN_KEY_PATH.to_owned(),
        }
    }

    /// `Ok(None)` when the key itself does not exist.
    fn read_key(&self, name: Option<&str>) -> Result<Option<RegKey>, RunKeyError> {
        match self.hkcu.open_subkey_with_flags(&self.path, KEY_READ) {
            Ok(key) => Ok(Some(key)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(access_err("open", name, e)),
        }
    }

    fn write_key(&self, name: &str) -> Result<RegKey, RunKeyError> {
        let (key, _) = self
            .hkcu
            .create_subkey(&self.path)
            .map_err(|e| access_err("open", Some(name), e))?;
        Ok(key)
    }
}

impl RunKey for WindowsRunKey {
    fn get(&self, name: &str) -> Result<Option<String>, RunKeyError> {
        let Some(key) = self.read_key(Some(name))? else {
            return Ok(None);
        };
        match key.get_value::<String, _>(name) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(access_err("read", Some(name), e)),
        }
    }

    fn set(&mut self, name: &str, value: &str) -> Result<(), RunKeyError> {
        self.write_key(name)?
            .set_value(name, &value)
            .map_err(|e| access_err("write", Some(name), e))
    }

    fn delete(&mut self, name: &str) -> Result<(), RunKeyError> {
        let not_found = || RunKeyError::NotFound {
            name: name.to_owned(),
        };
        if self.read_key(Some(name))?.is_none() {
            return Err(not_found());
        }
        match self.write_key(name)?.delete_value(name) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(not_found()),
            Err(e) => Err(access_err("delete", Some(name), e)),
        }
    }

    fn list_names(&self) -> Result<Vec<String>, RunKeyError> {
        let Some(key) = self.read_key(None)? else {
            return Ok(vec![]);
        };
        key.enum_values()
            .map(|entry| entry.map(|(name, _)| name))
            .collect::<io::Result<Vec<_>>>()
            .map_err(|e| access_err("list", None, e))
    }

    /// Single pass over `enum_values`; non-string values are skipped.
    fn snapshot(&self) -> Result<RunKeySnapshot, RunKeyError> {
        let Some(key) = self.read_key(None)? else {
            return Ok(RunKeySnapshot::new());
        };
        let mut snapshot = RunKeySnapshot::new();
        for entry in key.enum_values() {
            let (name, raw) = entry.map_err(|e| access_err("list", None, e))?;
            match String::from_reg_value(&raw) {
                Ok(value) => {
                    snapshot.insert(name, value);
                }
                Err(err) => tracing::debug!(name = %name, error = %err, "skipping non-string value"),
            }
        }
        Ok(snapshot)
    }
}
