//! Core data model types for ropegrade.
//!
//! These are the records passed between the scorer, the evaluator and
//! whatever store keeps a user's achievements and attempt history.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Achievement;

/// What kind of content an attempt was made against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AttemptKind {
    /// The certification exam for a whole module. Modules 1 to 3 are the
    /// primary track; anything else is a bonus or instructor track.
    FinalExam { module: u32 },
    /// A short quiz over a single lesson category.
    MicroQuiz {
        category_id: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        category_name: Option<String>,
    },
}

impl AttemptKind {
    pub fn is_final_exam(&self) -> bool {
        matches!(self, AttemptKind::FinalExam { .. })
    }

    /// Whether two attempts were made against the same module or category.
    ///
    /// Category names are display data and do not take part in the comparison.
    pub fn same_target(&self, other: &AttemptKind) -> bool {
        match (self, other) {
            (AttemptKind::FinalExam { module: a }, AttemptKind::FinalExam { module: b }) => a == b,
            (
                AttemptKind::MicroQuiz { category_id: a, .. },
                AttemptKind::MicroQuiz { category_id: b, .. },
            ) => a == b,
            _ => false,
        }
    }

    /// Stable short label, e.g. `module-2` or `micro-43`.
    pub fn target_key(&self) -> String {
        match self {
            AttemptKind::FinalExam { module } => format!("module-{module}"),
            AttemptKind::MicroQuiz { category_id, .. } => format!("micro-{category_id}"),
        }
    }
}

impl fmt::Display for AttemptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptKind::FinalExam { module } => write!(f, "final exam, module {module}"),
            AttemptKind::MicroQuiz {
                category_id,
                category_name: Some(name),
            } => write!(f, "micro-quiz {name} ({category_id})"),
            AttemptKind::MicroQuiz { category_id, .. } => write!(f, "micro-quiz {category_id}"),
        }
    }
}

/// One answered question as submitted by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    /// Option tag the user picked; `None` if the question was skipped.
    #[serde(default)]
    pub selected: Option<String>,
    /// Option tag that is correct.
    pub correct: String,
    /// Point value; absent means 1.
    #[serde(default)]
    pub points: Option<u32>,
}

impl AnsweredQuestion {
    /// Exact, case-sensitive tag equality.
    pub fn is_correct(&self) -> bool {
        self.selected.as_deref() == Some(self.correct.as_str())
    }

    pub fn point_value(&self) -> u32 {
        self.points.unwrap_or(1)
    }
}

/// The scored outcome of one completed attempt.
///
/// The percentage is always derived from `raw_score` and `max_score`; there
/// is no way to set it independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptResult {
    pub kind: AttemptKind,
    pub total_questions: u32,
    pub raw_score: u32,
    pub max_score: u32,
    pub duration_secs: u64,
    /// Hour of day (0..=23) on the user's own clock at submission.
    pub completed_at_local_hour: u8,
}

impl AttemptResult {
    /// `raw_score / max_score * 100`, or 0 for an exam worth no points.
    pub fn percentage_exact(&self) -> f64 {
        if self.max_score == 0 {
            return 0.0;
        }
        self.raw_score as f64 / self.max_score as f64 * 100.0
    }

    /// The percentage rounded to the nearest integer. All thresholds compare
    /// against this value.
    pub fn percentage(&self) -> u8 {
        self.percentage_exact().round().clamp(0.0, 100.0) as u8
    }
}

/// A summary of a past attempt, kept for streak and improvement checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub kind: AttemptKind,
    pub percentage: u8,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn from_result(result: &AttemptResult, recorded_at: DateTime<Utc>) -> Self {
        Self {
            kind: result.kind.clone(),
            percentage: result.percentage(),
            recorded_at,
        }
    }
}

/// Everything the evaluator needs to know about a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAchievementState {
    #[serde(default)]
    pub unlocked: BTreeSet<Achievement>,
    /// Append-only, oldest first.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl UserAchievementState {
    pub fn has(&self, achievement: Achievement) -> bool {
        self.unlocked.contains(&achievement)
    }

    /// Union in newly earned achievements. Returns how many were not
    /// already present.
    pub fn unlock_all(&mut self, achievements: &[Achievement]) -> usize {
        achievements
            .iter()
            .filter(|a| self.unlocked.insert(**a))
            .count()
    }

    /// Apply the outcome of one evaluated attempt.
    pub fn record(&mut self, entry: HistoryEntry, new_achievements: &[Achievement]) {
        self.unlock_all(new_achievements);
        self.history.push(entry);
    }
}

/// An answer sheet: one user's raw submission before scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSheet {
    pub user_id: String,
    pub kind: AttemptKind,
    pub started_at: DateTime<FixedOffset>,
    pub submitted_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub answers: Vec<AnsweredQuestion>,
}

/// What the caller gets back after a submission, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    pub id: Uuid,
    pub user_id: String,
    pub kind: AttemptKind,
    pub percentage: u8,
    pub raw_score: u32,
    pub max_score: u32,
    pub duration_secs: u64,
    #[serde(default)]
    pub new_achievements: Vec<Achievement>,
}

impl SubmissionOutcome {
    pub fn new(user_id: &str, result: &AttemptResult, new_achievements: Vec<Achievement>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            kind: result.kind.clone(),
            percentage: result.percentage(),
            raw_score: result.raw_score,
            max_score: result.max_score,
            duration_secs: result.duration_secs,
            new_achievements,
        }
    }
}
