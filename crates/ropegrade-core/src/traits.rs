//! The persistence seam.
//!
//! The core never talks to a database. Whoever runs submissions hands the
//! engine an [`AchievementRepository`]; `ropegrade-store` ships an in-memory
//! and a JSON-file implementation.

use async_trait::async_trait;

use crate::catalog::Achievement;
use crate::model::{HistoryEntry, UserAchievementState};

/// Read and write a user's achievement set and attempt history.
#[async_trait]
pub trait AchievementRepository: Send + Sync {
    /// Human-readable backend name (e.g. "json").
    fn name(&self) -> &str;

    /// Current state for a user. Unknown users get an empty state.
    async fn load(&self, user_id: &str) -> anyhow::Result<UserAchievementState>;

    /// Union `achievements` into the user's set. Re-adding a held medal is a no-op.
    async fn unlock(&self, user_id: &str, achievements: &[Achievement]) -> anyhow::Result<()>;

    /// Persist one evaluated attempt: union `achievements` into the set and
    /// append `entry` to the history as a single write. Either both land or
    /// neither does.
    async fn record(
        &self,
        user_id: &str,
        entry: HistoryEntry,
        achievements: &[Achievement],
    ) -> anyhow::Result<()>;
}
