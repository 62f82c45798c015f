//! Exam scoring.
//!
//! Turns a list of answered questions and the start/submit timestamps into an
//! [`AttemptResult`]. Pure: no clock reads, no I/O.

use chrono::{DateTime, FixedOffset, Timelike};

use crate::model::{AnswerSheet, AnsweredQuestion, AttemptKind, AttemptResult};

/// Score one attempt.
///
/// An empty answer list is valid and yields `max_score = 0`, which scores 0%.
/// The local hour is read from `submitted_at` in its own UTC offset, so the
/// caller should pass timestamps on the user's clock.
pub fn score_attempt(
    kind: AttemptKind,
    answers: &[AnsweredQuestion],
    started_at: DateTime<FixedOffset>,
    submitted_at: DateTime<FixedOffset>,
) -> AttemptResult {
    let (raw_score, max_score) = answers.iter().fold((0u32, 0u32), |(raw, max), q| {
        let points = q.point_value();
        let raw = if q.is_correct() {
            raw.saturating_add(points)
        } else {
            raw
        };
        (raw, max.saturating_add(points))
    });

    AttemptResult {
        kind,
        total_questions: u32::try_from(answers.len()).unwrap_or(u32::MAX),
        raw_score,
        max_score,
        duration_secs: elapsed_secs(started_at, submitted_at),
        completed_at_local_hour: submitted_at.hour() as u8,
    }
}

/// Score a parsed answer sheet.
pub fn score_sheet(sheet: &AnswerSheet) -> AttemptResult {
    score_attempt(
        sheet.kind.clone(),
        &sheet.answers,
        sheet.started_at,
        sheet.submitted_at,
    )
}

/// Whole seconds between two instants, floored and clamped at zero.
pub fn elapsed_secs(started_at: DateTime<FixedOffset>, submitted_at: DateTime<FixedOffset>) -> u64 {
    let millis = submitted_at
        .signed_duration_since(started_at)
        .num_milliseconds();
    if millis <= 0 {
        0
    } else {
        (millis / 1000) as u64
    }
}
