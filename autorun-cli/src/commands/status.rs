//! Menu 3: cached startup entries as a table.

use std::io::{self, BufRead, Write};

use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use autorun_core::{CacheStore, ItemFilter, RunKey, StartupItem};

use crate::shell::Shell;

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "state")]
    state: String,
    #[tabled(rename = "command")]
    command: String,
}

pub fn run<R, W, K, S>(shell: &mut Shell<R, W, K, S>) -> io::Result<()>
where
    R: BufRead,
    W: Write,
    K: RunKey,
    S: CacheStore,
{
    shell.heading("Startup entries")?;
    let items = shell.reconciler.items(ItemFilter::All);
    if items.is_empty() {
        return writeln!(shell.prompt.out(), "No startup entries configured.");
    }
    writeln!(shell.prompt.out(), "{}", render_table(&items))
}

fn state_label(item: &StartupItem) -> String {
    if item.enabled {
        "enabled".green().to_string()
    } else {
        "disabled".yellow().to_string()
    }
}

fn render_table(items: &[StartupItem]) -> Table {
    let rows: Vec<StatusTableRow> = items
        .iter()
        .enumerate()
        .map(|(i, item)| StatusTableRow {
            index: i + 1,
            name: item.name.clone(),
            state: state_label(item),
            command: item.command.clone(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table
}
