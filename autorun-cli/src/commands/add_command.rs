//! Menu 4: register a free-form command line.

use std::io::{self, BufRead, Write};

use autorun_core::{CacheStore, RunKey};

use crate::shell::Shell;

pub fn run<R, W, K, S>(shell: &mut Shell<R, W, K, S>) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    K: RunKey,
    S: CacheStore,
{
    loop {
        shell.heading("Add a command to startup")?;
        writeln!(shell.prompt.out(), "(enter 'b' to return to the menu)\n")?;

        let Some(name) = shell
            .prompt
            .ask_or_back("Entry name (e.g. TaskManager): ")?
        else {
            return Ok(());
        };
        if name.is_empty() {
            writeln!(shell.prompt.out(), "Name must not be empty.")?;
            continue;
        }

        {
            let out = shell.prompt.out();
            writeln!(out, "\nFull startup command, for example:")?;
            writeln!(out, r"  python E:\project\task-manager\main.py")?;
            writeln!(out, r"  E:\app\program.exe --arg value")?;
            writeln!(out, "(enter 'b' to go back a step)\n")?;
        }
        let Some(command) = shell.prompt.ask_or_back("Command: ")? else {
            continue;
        };
        if command.is_empty() {
            writeln!(shell.prompt.out(), "Command must not be empty.")?;
            continue;
        }

        match shell.reconciler.contains(&name) {
            Ok(false) => {}
            Ok(true) => {
                writeln!(shell.prompt.out(), "\nStartup entry {name} already exists.")?;
                if !shell.prompt.confirm("Replace it? (y/n): ")? {
                    return Ok(());
                }
            }
            Err(err) => return shell.failure("reading the Run key", &err),
        }

        if shell.confirm_entry("Add", &name, &command)? {
            match shell.reconciler.add_command(&command, &name) {
                Ok(_) => shell.success("Command added to startup.")?,
                Err(err) => shell.failure("add", &err)?,
            }
        }
        return Ok(());
    }
}
