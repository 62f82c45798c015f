//! Achievement evaluation.
//!
//! Given what a user has already unlocked, their history and a freshly scored
//! attempt, work out which medals this attempt earns. The evaluator never
//! touches the state it is given; persisting the result is the caller's job.

use serde::{Deserialize, Serialize};

use crate::catalog::Achievement;
use crate::model::{AttemptKind, AttemptResult, UserAchievementState};
use crate::statistics::{attempts_on, best_previous};

/// Percentage needed for the module medals and for fast-fingers.
pub const PASS_PERCENTAGE: u8 = 90;

/// Seconds per question under which an attempt counts as fast.
pub const FAST_SECS_PER_QUESTION: u64 = 7;

/// Night-watch window, `[start, end)` in local hours.
pub const NIGHT_HOURS: std::ops::Range<u8> = 0..6;

/// Points a repeat attempt must beat the earlier best by to count as a comeback.
pub const COMEBACK_MARGIN: u8 = 5;

/// Earlier attempts on the same target needed before hot-streak fires.
pub const HOT_STREAK_PRIOR_ATTEMPTS: usize = 4;

/// Identifies a lesson category either by its numeric id or by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryMatcher {
    #[serde(default)]
    pub ids: Vec<u32>,
    /// Lower-case terms matched as substrings of the category name.
    #[serde(default)]
    pub terms: Vec<String>,
}

impl CategoryMatcher {
    pub fn matches(&self, category_id: u32, category_name: Option<&str>) -> bool {
        if self.ids.contains(&category_id) {
            return true;
        }
        let Some(name) = category_name else {
            return false;
        };
        let name = name.to_lowercase();
        self.terms
            .iter()
            .filter(|t| !t.trim().is_empty())
            .any(|t| name.contains(&t.to_lowercase()))
    }
}

/// Tunables for the evaluator. The numeric thresholds are fixed; only the
/// category mapping and the history rules are configurable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    #[serde(default = "default_knots")]
    pub knots: CategoryMatcher,
    #[serde(default = "default_systems")]
    pub systems: CategoryMatcher,
    /// Enables the comeback and hot-streak rules.
    #[serde(default)]
    pub history_rules: bool,
}

fn default_knots() -> CategoryMatcher {
    CategoryMatcher {
        ids: vec![43],
        terms: vec!["čvor".into(), "cvor".into(), "knot".into()],
    }
}

fn default_systems() -> CategoryMatcher {
    CategoryMatcher {
        ids: vec![44],
        terms: vec![
            "sustav".into(),
            "kolotur".into(),
            "system".into(),
            "pulley".into(),
        ],
    }
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            knots: default_knots(),
            systems: default_systems(),
            history_rules: false,
        }
    }
}

/// Collects medals in discovery order, skipping anything already held.
struct Unlocks<'a> {
    state: &'a UserAchievementState,
    found: Vec<Achievement>,
}

impl<'a> Unlocks<'a> {
    fn new(state: &'a UserAchievementState) -> Self {
        Self {
            state,
            found: Vec::new(),
        }
    }

    fn add(&mut self, achievement: Achievement) {
        if !self.holds(achievement) {
            tracing::debug!(%achievement, "rule matched");
            self.found.push(achievement);
        }
    }

    /// Held before this call or earned earlier in it.
    fn holds(&self, achievement: Achievement) -> bool {
        self.state.has(achievement) || self.found.contains(&achievement)
    }
}

/// Return the achievements newly earned by `attempt`, in rule order.
///
/// Running this twice on the same inputs gives the same answer, and nothing
/// already in `state.unlocked` is ever returned.
pub fn evaluate(
    config: &EvaluatorConfig,
    state: &UserAchievementState,
    attempt: &AttemptResult,
) -> Vec<Achievement> {
    let percentage = attempt.percentage();
    let mut unlocks = Unlocks::new(state);

    if NIGHT_HOURS.contains(&attempt.completed_at_local_hour) {
        unlocks.add(Achievement::NightWatch);
    }

    if attempt.kind.is_final_exam() && percentage == 100 {
        unlocks.add(Achievement::Flawless);
    }

    if percentage >= PASS_PERCENTAGE
        && attempt.duration_secs < attempt.total_questions as u64 * FAST_SECS_PER_QUESTION
    {
        unlocks.add(Achievement::FastFingers);
    }

    if let AttemptKind::FinalExam { module } = attempt.kind {
        if percentage >= PASS_PERCENTAGE {
            if let Some(medal) = Achievement::for_module(module) {
                unlocks.add(medal);
            }
        }
    }

    // Must run after the module medals so a third pass completes the cycle
    // in the same call.
    if [
        Achievement::Module1,
        Achievement::Module2,
        Achievement::Module3,
    ]
    .iter()
    .all(|m| unlocks.holds(*m))
    {
        unlocks.add(Achievement::FullCycle);
    }

    if let AttemptKind::MicroQuiz {
        category_id,
        category_name,
    } = &attempt.kind
    {
        if percentage == 100 {
            let name = category_name.as_deref();
            if config.knots.matches(*category_id, name) {
                unlocks.add(Achievement::KnotMaster);
            }
            if config.systems.matches(*category_id, name) {
                unlocks.add(Achievement::SystemMaster);
            }
        }
    }

    if config.history_rules {
        if let Some(best) = best_previous(&state.history, &attempt.kind) {
            if percentage as u16 > best as u16 + COMEBACK_MARGIN as u16 {
                unlocks.add(Achievement::Comeback);
            }
        }
        if attempts_on(&state.history, &attempt.kind).count() >= HOT_STREAK_PRIOR_ATTEMPTS {
            unlocks.add(Achievement::HotStreak);
        }
    }

    unlocks.found
}
