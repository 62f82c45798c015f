//! Batch import reports with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Achievement;
use crate::model::SubmissionOutcome;

/// The result of submitting a batch of answer sheets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the batch finished.
    pub created_at: DateTime<Utc>,
    /// Successful submissions, in input order.
    pub outcomes: Vec<SubmissionOutcome>,
    /// Submissions that could not be recorded, in input order.
    #[serde(default)]
    pub failures: Vec<SubmissionFailure>,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// A sheet that failed to go through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionFailure {
    pub user_id: String,
    /// Target label of the sheet, e.g. `module-1`.
    pub target: String,
    pub error: String,
}

impl ImportReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Every medal handed out in this batch, with the user who earned it.
    pub fn unlocked(&self) -> impl Iterator<Item = (&str, Achievement)> {
        self.outcomes.iter().flat_map(|o| {
            o.new_achievements
                .iter()
                .map(move |a| (o.user_id.as_str(), *a))
        })
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Render a short markdown summary.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str("## Import summary\n\n");
        md.push_str(&format!(
            "{} submitted, {} failed, {} medal(s) unlocked\n\n",
            self.outcomes.len(),
            self.failures.len(),
            self.unlocked().count()
        ));

        if !self.outcomes.is_empty() {
            md.push_str("| User | Attempt | Score | Duration | New medals |\n");
            md.push_str("|------|---------|-------|----------|------------|\n");
            for o in &self.outcomes {
                let medals = if o.new_achievements.is_empty() {
                    "-".to_string()
                } else {
                    o.new_achievements
                        .iter()
                        .map(|a| a.display_name())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                md.push_str(&format!(
                    "| {} | {} | {}% ({}/{}) | {}s | {} |\n",
                    o.user_id,
                    o.kind.target_key(),
                    o.percentage,
                    o.raw_score,
                    o.max_score,
                    o.duration_secs,
                    medals
                ));
            }
        }

        if !self.failures.is_empty() {
            md.push_str("\n### Failures\n\n");
            for f in &self.failures {
                md.push_str(&format!("- {} / {}: {}\n", f.user_id, f.target, f.error));
            }
        }

        md
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AttemptKind;

    fn sample() -> ImportReport {
        ImportReport {
            id: Uuid::nil(),
            created_at: Utc::now(),
            outcomes: vec![
                SubmissionOutcome {
                    id: Uuid::nil(),
                    user_id: "ana".into(),
                    kind: AttemptKind::FinalExam { module: 3 },
                    percentage: 95,
                    raw_score: 19,
                    max_score: 20,
                    duration_secs: 840,
                    new_achievements: vec![Achievement::Module3, Achievement::FullCycle],
                },
                SubmissionOutcome {
                    id: Uuid::nil(),
                    user_id: "ivo".into(),
                    kind: AttemptKind::FinalExam { module: 1 },
                    percentage: 40,
                    raw_score: 4,
                    max_score: 10,
                    duration_secs: 300,
                    new_achievements: vec![],
                },
            ],
            failures: vec![SubmissionFailure {
                user_id: "mia".into(),
                target: "micro-43".into(),
                error: "store unavailable: locked".into(),
            }],
            duration_ms: 12,
        }
    }

    #[test]
    fn json_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");
        let report = sample();
        report.save_json(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: ImportReport = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.outcomes.len(), 2);
        assert_eq!(loaded.outcomes[0].new_achievements[1], Achievement::FullCycle);
        assert!(loaded.has_failures());
    }

    #[test]
    fn markdown_lists_outcomes_and_failures() {
        let md = sample().to_markdown();
        assert!(md.contains("2 submitted, 1 failed, 2 medal(s) unlocked"));
        assert!(md.contains("| ana | module-3 | 95% (19/20) | 840s | Module 3, Full Cycle |"));
        assert!(md.contains("| ivo | module-1 | 40% (4/10) | 300s | - |"));
        assert!(md.contains("- mia / micro-43: store unavailable: locked"));
    }
}
