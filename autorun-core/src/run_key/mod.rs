//! The `HKCU\...\CurrentVersion\Run` key as a narrow key-value port.
//!
//! - [`RunKey`] is the capability set the reconciler needs.
//! - [`MemoryRunKey`] is an in-memory adapter with injectable failures.
//! - `WindowsRunKey` (Windows only) talks to the real registry via `winreg`.

mod memory;
#[cfg(windows)]
mod windows;

pub use memory::MemoryRunKey;
#[cfg(windows)]
pub use windows::WindowsRunKey;

use crate::error::RunKeyError;
use crate::types::RunKeySnapshot;

/// String values stored under the Run key.
pub trait RunKey {
    /// Read one value. `Ok(None)` when the value does not exist.
    fn get(&self, name: &str) -> Result<Option<String>, RunKeyError>;

    /// Create or overwrite a value.
    fn set(&mut self, name: &str, value: &str) -> Result<(), RunKeyError>;

    /// Delete a value. Returns [`RunKeyError::NotFound`] if it is absent.
    fn delete(&mut self, name: &str) -> Result<(), RunKeyError>;

    /// Names of every value under the key.
    fn list_names(&self) -> Result<Vec<String>, RunKeyError>;

    /// Every readable string value under the key.
    ///
    /// Values that vanish or cannot be read as strings between listing and
    /// reading are skipped.
    fn snapshot(&self) -> Result<RunKeySnapshot, RunKeyError> {
        let mut snapshot = RunKeySnapshot::new();
        for name in self.list_names()? {
            match self.get(&name) {
                Ok(Some(value)) => {
                    snapshot.insert(name, value);
                }
                Ok(None) => {}
                Err(err) => tracing::warn!(name = %name, error = %err, "skipping unreadable value"),
            }
        }
        Ok(snapshot)
    }
}
