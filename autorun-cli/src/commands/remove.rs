//! Menu 2: delete a Run key value and forget it.
//!
//! Lists the live Run key rather than the cache, so values added by other
//! programs can be removed too. Values that are not strings are shown as
//! `(unreadable)` and can still be removed.

use std::io::{self, BufRead, Write};

use autorun_core::{CacheStore, RunKey};

use crate::shell::Shell;

const UNREADABLE: &str = "(unreadable)";

pub fn run<R, W, K, S>(shell: &mut Shell<R, W, K, S>) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    K: RunKey,
    S: CacheStore,
{
    let entries: Vec<(String, String)> = match shell.reconciler.registered_entries() {
        Ok(entries) => entries
            .into_iter()
            .map(|(name, value)| (name, value.unwrap_or_else(|| UNREADABLE.to_owned())))
            .collect(),
        Err(err) => return shell.failure("reading the Run key", &err),
    };
    if entries.is_empty() {
        return writeln!(shell.prompt.out(), "No startup programs are registered.");
    }

    shell.heading("Registered startup programs")?;
    for (i, (name, value)) in entries.iter().enumerate() {
        writeln!(shell.prompt.out(), "{}. {name}\n   {value}\n", i + 1)?;
    }
    let Some(idx) = shell.prompt.choose(entries.len())? else {
        return Ok(());
    };
    let (name, value) = &entries[idx];

    if !shell.confirm_entry("Remove", name, value)? {
        return Ok(());
    }
    match shell.reconciler.remove_program(name) {
        Ok(()) => shell.success(&format!("Removed {name} from startup.")),
        Err(err) => shell.failure("remove", &err),
    }
}
