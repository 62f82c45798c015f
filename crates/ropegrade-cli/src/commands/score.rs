//! The `ropegrade score` command.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use ropegrade_core::model::AttemptKind;
use ropegrade_core::parser::parse_sheet;
use ropegrade_core::scorer::score_sheet;

use super::OutputFormat;

#[derive(Serialize)]
struct ScoreView<'a> {
    user_id: &'a str,
    kind: &'a AttemptKind,
    percentage: u8,
    raw_score: u32,
    max_score: u32,
    total_questions: u32,
    duration_secs: u64,
    completed_at_local_hour: u8,
}

pub fn execute(sheet_path: PathBuf, format: OutputFormat) -> Result<()> {
    let sheet = parse_sheet(&sheet_path)?;
    let result = score_sheet(&sheet);

    match format {
        OutputFormat::Json => {
            let view = ScoreView {
                user_id: &sheet.user_id,
                kind: &result.kind,
                percentage: result.percentage(),
                raw_score: result.raw_score,
                max_score: result.max_score,
                total_questions: result.total_questions,
                duration_secs: result.duration_secs,
                completed_at_local_hour: result.completed_at_local_hour,
            };
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        OutputFormat::Text => {
            println!("{} :: {}", sheet.user_id, result.kind);
            println!(
                "Score: {}/{} ({}%)",
                result.raw_score,
                result.max_score,
                result.percentage()
            );
            println!("Questions: {}", result.total_questions);
            println!("Duration: {}s", result.duration_secs);
            println!(
                "Submitted at local hour: {:02}",
                result.completed_at_local_hour
            );
        }
    }

    Ok(())
}
