//! Fixed locations: the Run key and the cache file.
//!
//! Follows the `_at` pattern: `cache_path_at(dir)` is pure and used in
//! tests; `default_cache_path()` derives the directory from the running
//! executable and delegates.

use std::path::{Path, PathBuf};

/// Registry path under `HKEY_CURRENT_USER` whose values run at login.
pub const RUN_KEY_PATH: &str = r"Software\Microsoft\Windows\CurrentVersion\Run";

/// File name of the persisted cache, stored next to the executable.
pub const CACHE_FILE_NAME: &str = "autostart.json";

/// `<dir>/autostart.json`
pub fn cache_path_at(dir: &Path) -> PathBuf {
    dir.join(CACHE_FILE_NAME)
}

/// `autostart.json` beside the current executable.
pub fn default_cache_path() -> std::io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let dir = exe.parent().ok_or_else(|| {
        std::io::Error::other(format!(
            "executable path has no parent directory: {}",
            exe.display()
        ))
    })?;
    Ok(cache_path_at(dir))
}
