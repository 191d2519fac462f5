//! Menu 1: register an executable by path.
//!
//! The entry name is the file name without extension. Only existing `.exe`
//! files are accepted; relative paths resolve against the working directory.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use autorun_core::{program_name, quote_path, CacheStore, RunKey};

use crate::shell::Shell;

pub fn run<R, W, K, S>(shell: &mut Shell<R, W, K, S>) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    K: RunKey,
    S: CacheStore,
{
    shell.heading("Select a program")?;
    let Some(path) = select_exe(shell)? else {
        return Ok(());
    };
    let Some(name) = program_name(&path) else {
        return writeln!(shell.prompt.out(), "Cannot derive a name from {}.", path.display());
    };

    match shell.reconciler.contains(&name) {
        Ok(false) => {}
        Ok(true) => {
            let same = match shell.reconciler.is_registered(&path, &name) {
                Ok(same) => same,
                Err(err) => return shell.failure("reading the Run key", &err),
            };
            let note = if same {
                "is already registered for this program"
            } else {
                "already exists with a different command"
            };
            writeln!(shell.prompt.out(), "\nStartup entry {name} {note}.")?;
            if !shell.prompt.confirm("Replace it? (y/n): ")? {
                return Ok(());
            }
        }
        Err(err) => return shell.failure("reading the Run key", &err),
    }

    if !shell.confirm_entry("Add", &name, &quote_path(&path))? {
        return Ok(());
    }
    match shell.reconciler.add_program(&path, &name) {
        Ok(item) => shell.success(&format!("Added {} to startup.", item.name)),
        Err(err) => shell.failure("add", &err),
    }
}

/// Loop until the user enters an existing `.exe` or goes back.
fn select_exe<R, W, K, S>(shell: &mut Shell<R, W, K, S>) -> io::Result<Option<PathBuf>>
where
    R: BufRead,
    W: Write,
    K: RunKey,
    S: CacheStore,
{
    let cwd = std::env::current_dir()?;
    writeln!(shell.prompt.out(), "Current directory: {}", cwd.display())?;
    loop {
        let Some(input) = shell
            .prompt
            .ask_or_back("Path to the program (or 'b' to go back): ")?
        else {
            return Ok(None);
        };
        if input.is_empty() {
            continue;
        }
        let path = std::path::absolute(Path::new(input.trim_matches('"')))?;
        if is_exe_file(&path) {
            return Ok(Some(path));
        }
        writeln!(
            shell.prompt.out(),
            "Not an existing .exe file: {}",
            path.display()
        )?;
    }
}

fn is_exe_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("exe"))
}
