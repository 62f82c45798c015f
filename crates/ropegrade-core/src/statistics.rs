//! Aggregates over a user's attempt history.
//!
//! Used by the opt-in history rules and by profile views.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{AttemptKind, HistoryEntry};

/// Earlier attempts made against the same module or category as `kind`.
pub fn attempts_on<'a>(
    history: &'a [HistoryEntry],
    kind: &'a AttemptKind,
) -> impl Iterator<Item = &'a HistoryEntry> + 'a {
    history.iter().filter(move |h| h.kind.same_target(kind))
}

/// Best earlier percentage on the same target, if there was an earlier attempt.
pub fn best_previous(history: &[HistoryEntry], kind: &AttemptKind) -> Option<u8> {
    attempts_on(history, kind).map(|h| h.percentage).max()
}

/// Mean percentage across every recorded attempt.
pub fn average_percentage(history: &[HistoryEntry]) -> Option<f64> {
    if history.is_empty() {
        return None;
    }
    let total: u64 = history.iter().map(|h| h.percentage as u64).sum();
    Some(total as f64 / history.len() as f64)
}

/// Per-target summary of a history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetStats {
    /// Short label, e.g. `module-1`.
    pub target: String,
    /// Most recent kind seen for this target (carries the latest category name).
    pub kind: AttemptKind,
    pub attempts: usize,
    pub best: u8,
    pub latest: u8,
    pub average: f64,
}

/// Group a history by target, ordered by target label.
pub fn summarize(history: &[HistoryEntry]) -> Vec<TargetStats> {
    let mut grouped: BTreeMap<String, Vec<&HistoryEntry>> = BTreeMap::new();
    for h in history {
        grouped.entry(h.kind.target_key()).or_default().push(h);
    }

    grouped
        .into_iter()
        .filter_map(|(target, entries)| {
            let last = entries.last()?;
            let best = entries.iter().map(|h| h.percentage).max().unwrap_or(0);
            let sum: u64 = entries.iter().map(|h| h.percentage as u64).sum();
            Some(TargetStats {
                target,
                kind: last.kind.clone(),
                attempts: entries.len(),
                best,
                latest: last.percentage,
                average: sum as f64 / entries.len() as f64,
            })
        })
        .collect()
}
