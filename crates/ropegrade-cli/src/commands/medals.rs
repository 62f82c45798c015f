//! The `ropegrade medals` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use ropegrade_core::catalog::{Source, CATALOG};

use super::open_store;

pub async fn execute(user: String, config_path: Option<PathBuf>) -> Result<()> {
    let (_, store) = open_store(config_path.as_deref())?;
    let state = store.load(&user).await?;

    let mut table = Table::new();
    table.set_header(vec!["", "Medal", "Name", "Description", "Earned by"]);

    for entry in CATALOG {
        let mark = if state.has(entry.achievement) { "*" } else { "" };
        let source = match entry.source {
            Source::Attempt => "exam",
            Source::History => "history",
            Source::AdminGrant => "instructor",
            Source::External => "external",
        };
        table.add_row(vec![
            Cell::new(mark),
            Cell::new(entry.id),
            Cell::new(entry.display_name),
            Cell::new(entry.description),
            Cell::new(source),
        ]);
    }

    println!("{table}");
    println!(
        "{user}: {}/{} medals unlocked",
        state.unlocked.len(),
        CATALOG.len()
    );

    Ok(())
}
