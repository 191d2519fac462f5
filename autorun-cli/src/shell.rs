//! Interactive menu loop.

use std::io::{self, BufRead, Write};

use colored::Colorize;

use autorun_core::{CacheStore, ReconcileError, Reconciler, RunKey};

use crate::commands;
use crate::prompt::Prompt;

pub const RULE_WIDTH: usize = 60;

pub struct Shell<R, W, K, S> {
    pub(crate) prompt: Prompt<R, W>,
    pub(crate) reconciler: Reconciler<K, S>,
}

impl<R, W, K, S> Shell<R, W, K, S>
where
    R: BufRead,
    W: Write,
    K: RunKey,
    S: CacheStore,
{
    pub fn new(prompt: Prompt<R, W>, reconciler: Reconciler<K, S>) -> Self {
        Self { prompt, reconciler }
    }

    #[cfg(test)]
    pub fn into_parts(self) -> (Prompt<R, W>, Reconciler<K, S>) {
        (self.prompt, self.reconciler)
    }

    /// Sync once, then serve menu choices until "exit" or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        self.startup_sync()?;
        loop {
            self.print_menu()?;
            let Some(choice) = self.prompt.ask("Choose an action (1-7): ")? else {
                return Ok(());
            };
            match choice.as_str() {
                "1" => commands::add_program::run(self)?,
                "2" => commands::remove::run(self)?,
                "3" => commands::status::run(self)?,
                "4" => commands::add_command::run(self)?,
                "5" => commands::toggle::enable(self)?,
                "6" => commands::toggle::disable(self)?,
                "7" => {
                    writeln!(self.prompt.out(), "Goodbye!")?;
                    return Ok(());
                }
                _ => writeln!(self.prompt.out(), "Invalid choice, please try again.")?,
            }
        }
    }

    fn startup_sync(&mut self) -> io::Result<()> {
        match self.reconciler.sync() {
            Ok(report) => {
                if !report.is_empty() {
                    tracing::info!(?report, "startup sync applied changes");
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "startup sync skipped");
                writeln!(
                    self.prompt.out(),
                    "{} {err}",
                    "Sync skipped:".yellow().bold()
                )?;
            }
        }
        Ok(())
    }

    fn print_menu(&mut self) -> io::Result<()> {
        let out = self.prompt.out();
        writeln!(out)?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(out, "{}", "        Windows startup manager".bold())?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(out, "1. Add a program to startup")?;
        writeln!(out, "2. Remove a startup entry")?;
        writeln!(out, "3. Show startup status")?;
        writeln!(out, "4. Add a command to startup")?;
        writeln!(out, "5. Enable")?;
        writeln!(out, "6. Disable")?;
        writeln!(out, "7. Exit")?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))
    }

    pub(crate) fn heading(&mut self, title: &str) -> io::Result<()> {
        let out = self.prompt.out();
        writeln!(out)?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(out, "{}", title.bold())?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))
    }

    pub(crate) fn success(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.prompt.out(), "{}", message.green())
    }

    pub(crate) fn failure(&mut self, action: &str, err: &ReconcileError) -> io::Result<()> {
        tracing::debug!(kind = %err.kind(), error = %err, "{action} failed");
        writeln!(
            self.prompt.out(),
            "{} {action} failed ({}): {err}",
            "Error:".red().bold(),
            err.kind()
        )
    }

    /// Ask before touching an entry.
    pub(crate) fn confirm_entry(
        &mut self,
        action: &str,
        name: &str,
        value: &str,
    ) -> io::Result<bool> {
        let out = self.prompt.out();
        writeln!(out)?;
        writeln!(out, "{action} this startup entry?")?;
        writeln!(out, "Name:    {name}")?;
        writeln!(out, "Command: {value}")?;
        self.prompt.confirm("Confirm? (y/n): ")
    }
}

// ---------------------------------------------------------------------------
// Test harness shared by command tests
// ---------------------------------------------------------------------------
