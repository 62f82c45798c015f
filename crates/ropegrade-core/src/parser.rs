//! TOML answer sheet parser.
//!
//! Loads answer sheets from TOML files and directories, and validates them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use crate::model::{AnswerSheet, AnsweredQuestion, AttemptKind};

/// Intermediate TOML structure for parsing answer sheet files.
#[derive(Debug, Deserialize)]
struct TomlSheetFile {
    attempt: TomlAttemptHeader,
    #[serde(default)]
    answers: Vec<TomlAnswer>,
}

#[derive(Debug, Deserialize)]
struct TomlAttemptHeader {
    user: String,
    kind: String,
    #[serde(default)]
    module: Option<u32>,
    #[serde(default)]
    category_id: Option<u32>,
    #[serde(default)]
    category_name: Option<String>,
    started_at: String,
    submitted_at: String,
}

#[derive(Debug, Deserialize)]
struct TomlAnswer {
    #[serde(default)]
    selected: Option<String>,
    correct: String,
    #[serde(default)]
    points: Option<u32>,
}

fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value.trim())
        .with_context(|| format!("{field} is not an RFC 3339 timestamp: {value:?}"))
}

fn parse_kind(header: &TomlAttemptHeader) -> Result<AttemptKind> {
    match header.kind.trim().to_lowercase().as_str() {
        "final-exam" | "final" | "exam" => {
            let module = header
                .module
                .context("final-exam sheets need a `module` number")?;
            Ok(AttemptKind::FinalExam { module })
        }
        "micro-quiz" | "micro" | "quiz" => {
            let category_id = header
                .category_id
                .context("micro-quiz sheets need a `category_id`")?;
            let category_name = header
                .category_name
                .as_ref()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty());
            Ok(AttemptKind::MicroQuiz {
                category_id,
                category_name,
            })
        }
        other => anyhow::bail!("unknown attempt kind: {other}"),
    }
}

/// Parse a single TOML file into an `AnswerSheet`.
pub fn parse_sheet(path: &Path) -> Result<AnswerSheet> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answer sheet: {}", path.display()))?;

    parse_sheet_str(&content, path)
}

/// Parse a TOML string into an `AnswerSheet` (useful for testing).
pub fn parse_sheet_str(content: &str, source_path: &Path) -> Result<AnswerSheet> {
    let parsed: TomlSheetFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let kind = parse_kind(&parsed.attempt)
        .with_context(|| format!("invalid [attempt] in {}", source_path.display()))?;
    let started_at = parse_timestamp("started_at", &parsed.attempt.started_at)?;
    let submitted_at = parse_timestamp("submitted_at", &parsed.attempt.submitted_at)?;

    let user_id = parsed.attempt.user.trim().to_string();
    anyhow::ensure!(
        !user_id.is_empty(),
        "empty user in {}",
        source_path.display()
    );

    let answers = parsed
        .answers
        .into_iter()
        .map(|a| AnsweredQuestion {
            selected: a.selected,
            correct: a.correct,
            points: a.points,
        })
        .collect();

    Ok(AnswerSheet {
        user_id,
        kind,
        started_at,
        submitted_at,
        answers,
    })
}

/// Recursively load all `.toml` answer sheets from a directory.
///
/// Files that fail to parse are skipped with a warning. The result is sorted
/// by submission time so a user's attempts replay in the order they happened;
/// ties are broken by file path.
pub fn load_sheet_directory(dir: &Path) -> Result<Vec<AnswerSheet>> {
    let mut sheets = collect_sheets(dir)?;
    sheets.sort_by(|(a_path, a), (b_path, b)| {
        a.submitted_at
            .cmp(&b.submitted_at)
            .then_with(|| a_path.cmp(b_path))
    });
    Ok(sheets.into_iter().map(|(_, sheet)| sheet).collect())
}

fn collect_sheets(dir: &Path) -> Result<Vec<(PathBuf, AnswerSheet)>> {
    let mut sheets = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            sheets.extend(collect_sheets(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_sheet(&path) {
                Ok(sheet) => sheets.push((path, sheet)),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(sheets)
}

/// Load a single file, or every sheet under a directory.
pub fn load_sheets(path: &Path) -> Result<Vec<AnswerSheet>> {
    if path.is_dir() {
        load_sheet_directory(path)
    } else {
        Ok(vec![parse_sheet(path)?])
    }
}

/// A warning from answer sheet validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// 1-based answer index (if applicable).
    pub answer: Option<usize>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn sheet(message: impl Into<String>) -> Self {
        Self {
            answer: None,
            message: message.into(),
        }
    }

    fn answer(index: usize, message: impl Into<String>) -> Self {
        Self {
            answer: Some(index + 1),
            message: message.into(),
        }
    }
}

/// Validate an answer sheet for common issues. None of these stop a sheet
/// from being scored.
pub fn validate_sheet(sheet: &AnswerSheet) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if sheet.answers.is_empty() {
        warnings.push(ValidationWarning::sheet(
            "sheet has no answers and will score 0%",
        ));
    }

    if sheet.submitted_at < sheet.started_at {
        warnings.push(ValidationWarning::sheet(
            "submitted_at is before started_at; duration will be 0",
        ));
    }

    match &sheet.kind {
        AttemptKind::FinalExam { module } if !(1..=3).contains(module) => {
            warnings.push(ValidationWarning::sheet(format!(
                "module {module} is not a primary module; no module medal can be earned"
            )));
        }
        AttemptKind::MicroQuiz {
            category_name: None,
            ..
        } => {
            warnings.push(ValidationWarning::sheet(
                "micro-quiz has no category_name; category medals match by id only",
            ));
        }
        _ => {}
    }

    for (i, answer) in sheet.answers.iter().enumerate() {
        if answer.points == Some(0) {
            warnings.push(ValidationWarning::answer(i, "worth 0 points"));
        }
        if answer.selected.is_none() {
            warnings.push(ValidationWarning::answer(i, "unanswered"));
        }
        if answer.correct.trim().is_empty() {
            warnings.push(ValidationWarning::answer(i, "correct option is empty"));
        }
    }

    warnings
}
