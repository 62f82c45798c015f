//! Repository error types.
//!
//! Implementations of [`AchievementRepository`](crate::traits::AchievementRepository)
//! return these (wrapped in `anyhow::Error`) so the submission engine can
//! downcast and decide whether a failed write is worth retrying.

use thiserror::Error;

/// Errors a persistence backend can report.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The user id cannot be used as a storage key.
    #[error("invalid user id: {0:?}")]
    InvalidUser(String),

    /// The stored document exists but cannot be read back.
    #[error("corrupt state for user {user_id}: {message}")]
    Corrupt { user_id: String, message: String },

    /// The backend could not be reached or is busy.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    /// Returns `true` if retrying the same call cannot help.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            RepositoryError::InvalidUser(_) | RepositoryError::Corrupt { .. }
        )
    }
}

/// Classify an `anyhow` error coming out of a repository call.
///
/// Errors that are not a [`RepositoryError`] are treated as permanent.
pub fn is_transient(err: &anyhow::Error) -> bool {
    err.chain()
        .find_map(|e| e.downcast_ref::<RepositoryError>())
        .is_some_and(|e| !e.is_permanent())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn classify_permanent_and_transient() {
        assert!(RepositoryError::InvalidUser("../x".into()).is_permanent());
        assert!(RepositoryError::Corrupt {
            user_id: "ana".into(),
            message: "eof".into()
        }
        .is_permanent());
        assert!(!RepositoryError::Unavailable("locked".into()).is_permanent());
    }

    #[test]
    fn transient_survives_context_wrapping() {
        let err: anyhow::Result<()> = Err(RepositoryError::Unavailable("busy".into()).into());
        let wrapped = err.context("failed to append history").unwrap_err();
        assert!(is_transient(&wrapped));

        let other = anyhow::anyhow!("disk on fire");
        assert!(!is_transient(&other));
    }
}
