//! In-memory repository, for tests and one-shot runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use ropegrade_core::catalog::Achievement;
use ropegrade_core::error::RepositoryError;
use ropegrade_core::model::{HistoryEntry, UserAchievementState};
use ropegrade_core::traits::AchievementRepository;

/// Keeps every user's state in a map. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    states: RwLock<HashMap<String, UserAchievementState>>,
    /// Number of write calls made.
    write_count: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of unlock/record calls made to this store.
    pub fn write_count(&self) -> u32 {
        self.write_count.load(Ordering::Relaxed)
    }

    /// Ids of every user with stored state, sorted.
    pub async fn users(&self) -> Vec<String> {
        let mut users: Vec<String> = self.states.read().await.keys().cloned().collect();
        users.sort();
        users
    }
}

fn check_user(user_id: &str) -> Result<(), RepositoryError> {
    if user_id.trim().is_empty() {
        return Err(RepositoryError::InvalidUser(user_id.to_string()));
    }
    Ok(())
}

#[async_trait]
impl AchievementRepository for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self, user_id: &str) -> anyhow::Result<UserAchievementState> {
        check_user(user_id)?;
        Ok(self
            .states
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn unlock(&self, user_id: &str, achievements: &[Achievement]) -> anyhow::Result<()> {
        check_user(user_id)?;
        self.write_count.fetch_add(1, Ordering::Relaxed);
        self.states
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .unlock_all(achievements);
        Ok(())
    }

    async fn record(
        &self,
        user_id: &str,
        entry: HistoryEntry,
        achievements: &[Achievement],
    ) -> anyhow::Result<()> {
        check_user(user_id)?;
        self.write_count.fetch_add(1, Ordering::Relaxed);
        self.states
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .record(entry, achievements);
        Ok(())
    }
}
