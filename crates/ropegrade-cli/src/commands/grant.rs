//! The `ropegrade grant` command.

use std::path::PathBuf;

use anyhow::Result;

use ropegrade_core::catalog::Achievement;
use ropegrade_core::engine::SubmissionEngine;

use super::open_store;

pub async fn execute(user: String, medal: String, config_path: Option<PathBuf>) -> Result<()> {
    let achievement: Achievement = medal.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let (config, store) = open_store(config_path.as_deref())?;
    let engine = SubmissionEngine::new(store, config.engine_config());

    if engine.grant(&user, achievement).await? {
        println!("Granted {} to {user}", achievement.display_name());
    } else {
        println!("{user} already holds {}", achievement.display_name());
    }

    Ok(())
}
