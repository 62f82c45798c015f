//! The `ropegrade validate` command.

use std::path::PathBuf;

use anyhow::Result;

use ropegrade_core::parser::{load_sheets, validate_sheet};

pub fn execute(sheet_path: PathBuf) -> Result<()> {
    let sheets = load_sheets(&sheet_path)?;

    let mut total_warnings = 0;

    for sheet in &sheets {
        println!(
            "Sheet: {} :: {} ({} answers)",
            sheet.user_id,
            sheet.kind,
            sheet.answers.len()
        );

        let warnings = validate_sheet(sheet);
        for w in &warnings {
            let prefix = w
                .answer
                .map(|n| format!("  [answer {n}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if sheets.is_empty() {
        println!("No answer sheets found.");
    } else if total_warnings == 0 {
        println!("All answer sheets valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
