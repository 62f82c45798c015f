//! The `ropegrade submit` command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use ropegrade_core::engine::{ProgressReporter, SubmissionEngine};
use ropegrade_core::model::SubmissionOutcome;
use ropegrade_core::parser::{load_sheets, validate_sheet};
use ropegrade_core::report::ImportReport;

use super::{open_store, ReportFormat};

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_submission_start(&self, user_id: &str, target: &str) {
        eprintln!("  Submitting: {user_id} :: {target}");
    }

    fn on_submission_complete(&self, outcome: &SubmissionOutcome) {
        let medals = if outcome.new_achievements.is_empty() {
            String::new()
        } else {
            let ids: Vec<String> = outcome
                .new_achievements
                .iter()
                .map(|a| a.to_string())
                .collect();
            format!(" +{}", ids.join(", +"))
        };
        eprintln!(
            "  Done: {} :: {} {}%{}",
            outcome.user_id,
            outcome.kind.target_key(),
            outcome.percentage,
            medals,
        );
    }

    fn on_submission_error(&self, user_id: &str, target: &str, error: &str) {
        eprintln!("  ERROR: {user_id} :: {target}: {error}");
    }

    fn on_batch_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {completed}/{total} recorded, {failed} failed ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    sheet_path: PathBuf,
    config_path: Option<PathBuf>,
    format: ReportFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    let (config, store) = open_store(config_path.as_deref())?;

    let sheets = load_sheets(&sheet_path)?;
    anyhow::ensure!(
        !sheets.is_empty(),
        "no answer sheets found at {}",
        sheet_path.display()
    );
    for sheet in &sheets {
        for w in validate_sheet(sheet) {
            tracing::warn!(user = %sheet.user_id, target = %sheet.kind.target_key(), "{}", w.message);
        }
    }

    eprintln!(
        "Submitting {} sheet(s) to the {} store",
        sheets.len(),
        store.name()
    );

    let engine = SubmissionEngine::new(store, config.engine_config());
    let report = engine.submit_all(&sheets, &ConsoleReporter).await?;

    if let Some(path) = &output {
        report.save_json(path)?;
        eprintln!("Report: {}", path.display());
    }

    match format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        ReportFormat::Markdown => print!("{}", report.to_markdown()),
        ReportFormat::Text => print_summary(&report),
    }

    if report.has_failures() {
        anyhow::bail!("{} submission(s) failed", report.failures.len());
    }

    Ok(())
}

fn print_summary(report: &ImportReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["User", "Target", "Score", "Duration", "New medals"]);

    for outcome in &report.outcomes {
        let medals: Vec<&str> = outcome
            .new_achievements
            .iter()
            .map(|a| a.display_name())
            .collect();
        table.add_row(vec![
            Cell::new(&outcome.user_id),
            Cell::new(outcome.kind.target_key()),
            Cell::new(format!(
                "{}% ({}/{})",
                outcome.percentage, outcome.raw_score, outcome.max_score
            )),
            Cell::new(format!("{}s", outcome.duration_secs)),
            Cell::new(medals.join(", ")),
        ]);
    }

    println!("{table}");
    let unlocked = report.unlocked().count();
    println!("{unlocked} medal(s) unlocked");
}
