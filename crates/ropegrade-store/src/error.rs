//! Store error types.

use std::path::PathBuf;

use ropegrade_core::error::RepositoryError;
use thiserror::Error;

/// Errors raised while opening or talking to a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The configured data directory cannot be created or used.
    #[error("data directory {path} is unusable: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading or writing a user document failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A repository-level failure the engine knows how to classify.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl StoreError {
    /// Map I/O failures onto the repository error the engine classifies.
    ///
    /// Interrupted, would-block and timed-out operations are reported as
    /// `Unavailable` so the engine retries them.
    pub fn into_repository(self, user_id: &str) -> RepositoryError {
        match self {
            StoreError::Repository(e) => e,
            StoreError::Io { path, source } | StoreError::DataDir { path, source } => {
                use std::io::ErrorKind;
                match source.kind() {
                    ErrorKind::Interrupted | ErrorKind::WouldBlock | ErrorKind::TimedOut => {
                        RepositoryError::Unavailable(format!("{}: {source}", path.display()))
                    }
                    _ => RepositoryError::Corrupt {
                        user_id: user_id.to_string(),
                        message: format!("{}: {source}", path.display()),
                    },
                }
            }
        }
    }
}
