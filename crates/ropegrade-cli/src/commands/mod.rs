pub mod grant;
pub mod history;
pub mod init;
pub mod medals;
pub mod score;
pub mod submit;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use ropegrade_core::traits::AchievementRepository;
use ropegrade_store::{create_store, load_config_from, RopegradeConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Formats for a batch import report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
    Markdown,
}

/// Load config and open the repository it points at.
pub fn open_store(
    config_path: Option<&Path>,
) -> Result<(RopegradeConfig, Arc<dyn AchievementRepository>)> {
    let config = load_config_from(config_path)?;
    let store = create_store(&config.store)?;
    tracing::debug!(store = store.name(), "opened store");
    Ok((config, store))
}
