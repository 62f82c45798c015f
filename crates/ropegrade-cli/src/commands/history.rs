//! The `ropegrade history` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use ropegrade_core::statistics::{average_percentage, summarize};

use super::open_store;

/// How many of the latest attempts to list under the summary.
const RECENT: usize = 10;

pub async fn execute(user: String, config_path: Option<PathBuf>) -> Result<()> {
    let (_, store) = open_store(config_path.as_deref())?;
    let state = store.load(&user).await?;

    if state.history.is_empty() {
        println!("No attempts recorded for {user}.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Target", "Attempt", "Tries", "Best", "Latest", "Average"]);
    for stats in summarize(&state.history) {
        table.add_row(vec![
            Cell::new(&stats.target),
            Cell::new(stats.kind.to_string()),
            Cell::new(stats.attempts),
            Cell::new(format!("{}%", stats.best)),
            Cell::new(format!("{}%", stats.latest)),
            Cell::new(format!("{:.1}%", stats.average)),
        ]);
    }
    println!("{table}");

    println!("\nRecent attempts:");
    for entry in state.history.iter().rev().take(RECENT) {
        println!(
            "  {}  {:<10} {:>3}%",
            entry.recorded_at.format("%Y-%m-%d %H:%M UTC"),
            entry.kind.target_key(),
            entry.percentage
        );
    }

    if let Some(avg) = average_percentage(&state.history) {
        println!(
            "\n{user}: {} attempt(s), {avg:.1}% average",
            state.history.len()
        );
    }

    Ok(())
}
