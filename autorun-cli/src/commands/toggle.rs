//! Menus 5 and 6: soft-enable and soft-disable cached entries.

use std::io::{self, BufRead, Write};

use autorun_core::{CacheStore, ItemFilter, RunKey, StartupItem};

use crate::shell::Shell;

pub fn enable<R, W, K, S>(shell: &mut Shell<R, W, K, S>) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    K: RunKey,
    S: CacheStore,
{
    let Some(item) = pick(shell, ItemFilter::Disabled, "Disabled startup entries")? else {
        return Ok(());
    };
    if !shell.confirm_entry("Enable", &item.name, &item.command)? {
        return Ok(());
    }
    match shell.reconciler.enable(&item.name) {
        Ok(item) => shell.success(&format!("Enabled {}.", item.name)),
        Err(err) => shell.failure("enable", &err),
    }
}

pub fn disable<R, W, K, S>(shell: &mut Shell<R, W, K, S>) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    K: RunKey,
    S: CacheStore,
{
    let Some(item) = pick(shell, ItemFilter::Enabled, "Enabled startup entries")? else {
        return Ok(());
    };
    if !shell.confirm_entry("Disable", &item.name, &item.command)? {
        return Ok(());
    }
    match shell.reconciler.disable(&item.name) {
        Ok(item) => shell.success(&format!("Disabled {}.", item.name)),
        Err(err) => shell.failure("disable", &err),
    }
}

fn pick<R, W, K, S>(
    shell: &mut Shell<R, W, K, S>,
    filter: ItemFilter,
    title: &str,
) -> io::Result<Option<StartupItem>>
where
    R: BufRead,
    W: Write,
    K: RunKey,
    S: CacheStore,
{
    shell.heading(title)?;
    let mut items = shell.reconciler.items(filter);
    if items.is_empty() {
        writeln!(shell.prompt.out(), "Nothing to show.")?;
        return Ok(None);
    }
    for (i, item) in items.iter().enumerate() {
        writeln!(shell.prompt.out(), "{}. {}\n   {}\n", i + 1, item.name, item.command)?;
    }
    Ok(shell.prompt.choose(items.len())?.map(|idx| items.swap_remove(idx)))
}
