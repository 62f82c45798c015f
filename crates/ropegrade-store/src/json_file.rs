//! File-backed repository: one pretty-printed JSON document per user.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;

use ropegrade_core::catalog::Achievement;
use ropegrade_core::error::RepositoryError;
use ropegrade_core::model::{HistoryEntry, UserAchievementState};
use ropegrade_core::traits::AchievementRepository;

use crate::error::StoreError;

/// Stores `<dir>/<user_id>.json`. Writes go through a temp file and a
/// rename, and are serialized by a store-wide lock.
pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::DataDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Path of a user's document. Ids are restricted to a safe file-name
    /// alphabet so they can never escape the data directory.
    fn path_for(&self, user_id: &str) -> Result<PathBuf, RepositoryError> {
        let valid = !user_id.is_empty()
            && user_id.len() <= 128
            && !user_id.starts_with('.')
            && user_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'));
        if !valid {
            return Err(RepositoryError::InvalidUser(user_id.to_string()));
        }
        Ok(self.dir.join(format!("{user_id}.json")))
    }

    async fn read_state(&self, user_id: &str) -> Result<UserAchievementState, RepositoryError> {
        let path = self.path_for(user_id)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(UserAchievementState::default());
            }
            Err(source) => {
                return Err(StoreError::Io { path, source }.into_repository(user_id));
            }
        };
        serde_json::from_str(&content).map_err(|e| RepositoryError::Corrupt {
            user_id: user_id.to_string(),
            message: format!("{}: {e}", path.display()),
        })
    }

    async fn write_state(
        &self,
        user_id: &str,
        state: &UserAchievementState,
    ) -> Result<(), RepositoryError> {
        let path = self.path_for(user_id)?;
        let json = serde_json::to_string_pretty(state).map_err(|e| RepositoryError::Corrupt {
            user_id: user_id.to_string(),
            message: e.to_string(),
        })?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(|source| {
            StoreError::Io {
                path: tmp.clone(),
                source,
            }
            .into_repository(user_id)
        })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| StoreError::Io { path, source }.into_repository(user_id))?;
        Ok(())
    }

    /// Read-modify-write under the store lock.
    async fn update<F>(&self, user_id: &str, apply: F) -> anyhow::Result<()>
    where
        F: FnOnce(&mut UserAchievementState),
    {
        let _guard = self.write_lock.lock().await;
        let mut state = self.read_state(user_id).await?;
        apply(&mut state);
        self.write_state(user_id, &state).await?;
        tracing::debug!(user = user_id, dir = %self.dir.display(), "state written");
        Ok(())
    }
}

#[async_trait]
impl AchievementRepository for JsonFileStore {
    fn name(&self) -> &str {
        "json"
    }

    async fn load(&self, user_id: &str) -> anyhow::Result<UserAchievementState> {
        Ok(self.read_state(user_id).await?)
    }

    async fn unlock(&self, user_id: &str, achievements: &[Achievement]) -> anyhow::Result<()> {
        self.update(user_id, |state| {
            state.unlock_all(achievements);
        })
        .await
    }

    async fn record(
        &self,
        user_id: &str,
        entry: HistoryEntry,
        achievements: &[Achievement],
    ) -> anyhow::Result<()> {
        self.update(user_id, move |state| state.record(entry, achievements)).await
    }
}
