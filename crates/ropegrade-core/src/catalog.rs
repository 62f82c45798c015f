//! The static achievement (medal) catalog.
//!
//! The catalog is fixed at build time and identical for every user. The
//! evaluator only ever hands out [`Achievement`] values; display metadata is
//! looked up here when something needs to be shown.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A medal a user can unlock.
///
/// Serialized as its kebab-case id. The legacy tags written by the previous
/// document store are accepted as aliases when reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Achievement {
    #[serde(rename = "night-watch", alias = "nocnastraza")]
    NightWatch,
    #[serde(rename = "flawless", alias = "nepogresivi")]
    Flawless,
    #[serde(rename = "fast-fingers", alias = "brziprst")]
    FastFingers,
    #[serde(rename = "module-1", alias = "modul1")]
    Module1,
    #[serde(rename = "module-2", alias = "modul2")]
    Module2,
    #[serde(rename = "module-3", alias = "modul3")]
    Module3,
    #[serde(rename = "full-cycle", alias = "maratonac")]
    FullCycle,
    #[serde(rename = "knot-master", alias = "majstorcvorova")]
    KnotMaster,
    #[serde(rename = "system-master", alias = "majstorsustava")]
    SystemMaster,
    #[serde(rename = "comeback", alias = "povratnik")]
    Comeback,
    #[serde(rename = "hot-streak", alias = "vatreniniz")]
    HotStreak,
    #[serde(rename = "quick-hand", alias = "brzaruka")]
    QuickHand,
    #[serde(rename = "top-one-percent", alias = "top1")]
    TopOnePercent,
    #[serde(rename = "team-leader", alias = "teamleader")]
    TeamLeader,
    #[serde(rename = "theory-master", alias = "majstorteorije")]
    TheoryMaster,
    #[serde(rename = "practitioner", alias = "vjezbatelj")]
    Practitioner,
    #[serde(rename = "instructor", alias = "instruktor")]
    Instructor,
}

/// How an achievement ends up in a user's collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Unlocked by the per-attempt evaluator.
    Attempt,
    /// Unlocked by the opt-in history rules.
    History,
    /// Handed out by an administrator.
    AdminGrant,
    /// Computed by a collaborator outside this crate (rankings, referrals).
    External,
}

/// Display metadata for one catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub achievement: Achievement,
    pub id: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub source: Source,
}

const fn entry(
    achievement: Achievement,
    id: &'static str,
    display_name: &'static str,
    description: &'static str,
    source: Source,
) -> CatalogEntry {
    CatalogEntry {
        achievement,
        id,
        display_name,
        description,
        source,
    }
}

/// Every catalog entry, in display order.
pub const CATALOG: &[CatalogEntry] = &[
    entry(
        Achievement::TopOnePercent,
        "top-one-percent",
        "Top 1%",
        "Ranked in the top three on all three modules.",
        Source::External,
    ),
    entry(
        Achievement::FastFingers,
        "fast-fingers",
        "Fast Fingers",
        "Scored 90% or more in under seven seconds per question.",
        Source::Attempt,
    ),
    entry(
        Achievement::QuickHand,
        "quick-hand",
        "Quick Hand",
        "Finished three exams in a row faster than average.",
        Source::External,
    ),
    entry(
        Achievement::FullCycle,
        "full-cycle",
        "Full Cycle",
        "Passed the final exams of modules 1, 2 and 3.",
        Source::Attempt,
    ),
    entry(
        Achievement::TeamLeader,
        "team-leader",
        "Team Leader",
        "Invited three friends who registered through your link.",
        Source::External,
    ),
    entry(
        Achievement::HotStreak,
        "hot-streak",
        "Hot Streak",
        "Took the same exam for the fifth time.",
        Source::History,
    ),
    entry(
        Achievement::Flawless,
        "flawless",
        "Flawless",
        "Answered every question correctly on a module final exam.",
        Source::Attempt,
    ),
    entry(
        Achievement::NightWatch,
        "night-watch",
        "Night Watch",
        "Finished an exam between 00:00 and 06:00.",
        Source::Attempt,
    ),
    entry(
        Achievement::TheoryMaster,
        "theory-master",
        "Theory Master",
        "Completed every micro-quiz and all three final exams.",
        Source::External,
    ),
    entry(
        Achievement::Comeback,
        "comeback",
        "Comeback",
        "Beat your best earlier result on the same exam by more than 5 points.",
        Source::History,
    ),
    entry(
        Achievement::KnotMaster,
        "knot-master",
        "Knot Master",
        "Scored 100% on the knots micro-quiz.",
        Source::Attempt,
    ),
    entry(
        Achievement::SystemMaster,
        "system-master",
        "System Master",
        "Scored 100% on the pulley systems micro-quiz.",
        Source::Attempt,
    ),
    entry(
        Achievement::Module1,
        "module-1",
        "Module 1",
        "Passed the module 1 final exam.",
        Source::Attempt,
    ),
    entry(
        Achievement::Module2,
        "module-2",
        "Module 2",
        "Passed the module 2 final exam.",
        Source::Attempt,
    ),
    entry(
        Achievement::Module3,
        "module-3",
        "Module 3",
        "Passed the module 3 final exam.",
        Source::Attempt,
    ),
    entry(
        Achievement::Practitioner,
        "practitioner",
        "Practitioner",
        "Special medal granted by an administrator.",
        Source::AdminGrant,
    ),
    entry(
        Achievement::Instructor,
        "instructor",
        "Instructor",
        "Special medal granted by an administrator.",
        Source::AdminGrant,
    ),
];

impl Achievement {
    /// Catalog metadata for this achievement.
    pub fn entry(self) -> &'static CatalogEntry {
        CATALOG
            .iter()
            .find(|e| e.achievement == self)
            .unwrap_or_else(|| unreachable!("{self:?} is missing from the catalog"))
    }

    /// The canonical kebab-case id.
    pub fn id(self) -> &'static str {
        self.entry().id
    }

    pub fn display_name(self) -> &'static str {
        self.entry().display_name
    }

    pub fn description(self) -> &'static str {
        self.entry().description
    }

    pub fn source(self) -> Source {
        self.entry().source
    }

    /// The primary-module medal for a final exam module, if there is one.
    pub fn for_module(module: u32) -> Option<Achievement> {
        match module {
            1 => Some(Achievement::Module1),
            2 => Some(Achievement::Module2),
            3 => Some(Achievement::Module3),
            _ => None,
        }
    }

    /// Whether an administrator may hand this out directly.
    pub fn is_admin_grantable(self) -> bool {
        self.source() == Source::AdminGrant
    }
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Legacy tags from the previous document store, mapped to current ids.
const LEGACY_TAGS: &[(&str, Achievement)] = &[
    ("nocnastraza", Achievement::NightWatch),
    ("nepogresivi", Achievement::Flawless),
    ("brziprst", Achievement::FastFingers),
    ("modul1", Achievement::Module1),
    ("modul2", Achievement::Module2),
    ("modul3", Achievement::Module3),
    ("maratonac", Achievement::FullCycle),
    ("majstorcvorova", Achievement::KnotMaster),
    ("majstorsustava", Achievement::SystemMaster),
    ("povratnik", Achievement::Comeback),
    ("vatreniniz", Achievement::HotStreak),
    ("brzaruka", Achievement::QuickHand),
    ("top1", Achievement::TopOnePercent),
    ("teamleader", Achievement::TeamLeader),
    ("majstorteorije", Achievement::TheoryMaster),
    ("vjezbatelj", Achievement::Practitioner),
    ("instruktor", Achievement::Instructor),
];

impl FromStr for Achievement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase();
        CATALOG
            .iter()
            .find(|e| e.id == tag)
            .map(|e| e.achievement)
            .or_else(|| {
                LEGACY_TAGS
                    .iter()
                    .find(|(legacy, _)| *legacy == tag)
                    .map(|(_, a)| *a)
            })
            .ok_or_else(|| format!("unknown achievement: {s}"))
    }
}
