//! Configuration loading and repository factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use ropegrade_core::engine::SubmissionEngineConfig;
use ropegrade_core::evaluator::EvaluatorConfig;
use ropegrade_core::traits::AchievementRepository;

use crate::json_file::JsonFileStore;
use crate::memory::MemoryStore;

/// Env var that overrides the JSON store directory.
pub const DATA_DIR_ENV: &str = "ROPEGRADE_DATA_DIR";

/// Where achievement state lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    /// Process-local; nothing is persisted.
    Memory,
    /// One JSON document per user under `dir`.
    Json {
        #[serde(default = "default_data_dir")]
        dir: PathBuf,
    },
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::Json {
            dir: default_data_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./ropegrade-data")
}

/// Top-level ropegrade configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RopegradeConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub evaluator: EvaluatorConfig,
    /// Max users processed concurrently during a batch submit.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Max retries on transient store errors.
    #[serde(default = "default_retries")]
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

fn default_parallelism() -> usize {
    4
}
fn default_retries() -> u32 {
    3
}
fn default_retry_delay() -> u64 {
    200
}

impl Default for RopegradeConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            evaluator: EvaluatorConfig::default(),
            parallelism: default_parallelism(),
            max_retries: default_retries(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

impl RopegradeConfig {
    /// Engine settings derived from this config.
    pub fn engine_config(&self) -> SubmissionEngineConfig {
        SubmissionEngineConfig {
            parallelism: self.parallelism.max(1),
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            evaluator: self.evaluator.clone(),
        }
    }

    /// Apply the data-dir override and resolve `${VAR}` references.
    fn finish(mut self, data_dir_override: Option<String>) -> Self {
        if let Some(dir) = data_dir_override.filter(|d| !d.trim().is_empty()) {
            self.store = StoreConfig::Json {
                dir: PathBuf::from(dir),
            };
        }
        if let StoreConfig::Json { dir } = &self.store {
            self.store = StoreConfig::Json {
                dir: PathBuf::from(resolve_env_vars(&dir.to_string_lossy())),
            };
        }
        self
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
/// Unset variables resolve to the empty string. Substituted values are not
/// scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    let mut cursor = 0;
    while let Some(offset) = result[cursor..].find("${") {
        let start = cursor + offset;
        let Some(end) = result[start..].find('}') else {
            break;
        };
        let var_name = &result[start + 2..start + end];
        let value = std::env::var(var_name).unwrap_or_default();
        result = format!(
            "{}{}{}",
            &result[..start],
            value,
            &result[start + end + 1..]
        );
        cursor = start + value.len();
    }
    result
}

/// Load config from an explicit path, or search the well-known paths.
///
/// Search order without a path:
/// 1. `ropegrade.toml` in the current directory
/// 2. `~/.config/ropegrade/config.toml`
///
/// `ROPEGRADE_DATA_DIR` overrides the store directory.
pub fn load_config_from(path: Option<&Path>) -> Result<RopegradeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("ropegrade.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = parse_config(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            config
        }
        None => RopegradeConfig::default(),
    };

    Ok(config.finish(std::env::var(DATA_DIR_ENV).ok()))
}

fn parse_config(content: &str) -> Result<RopegradeConfig> {
    Ok(toml::from_str(content)?)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("ropegrade"))
}

/// Create a repository from its configuration.
pub fn create_store(config: &StoreConfig) -> Result<Arc<dyn AchievementRepository>> {
    match config {
        StoreConfig::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreConfig::Json { dir } => {
            let store = JsonFileStore::open(dir)
                .with_context(|| format!("failed to open store at {}", dir.display()))?;
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_ROPEGRADE_TEST_VAR", "club");
        assert_eq!(resolve_env_vars("${_ROPEGRADE_TEST_VAR}"), "club");
        assert_eq!(
            resolve_env_vars("/srv/${_ROPEGRADE_TEST_VAR}/data"),
            "/srv/club/data"
        );
        assert_eq!(resolve_env_vars("no ${closing"), "no ${closing");
        std::env::remove_var("_ROPEGRADE_TEST_VAR");
    }

    #[test]
    fn resolve_env_vars_does_not_expand_values() {
        std::env::set_var("_ROPEGRADE_SELF_REF", "${_ROPEGRADE_SELF_REF}");
        assert_eq!(
            resolve_env_vars("/d/${_ROPEGRADE_SELF_REF}/x"),
            "/d/${_ROPEGRADE_SELF_REF}/x"
        );
        std::env::remove_var("_ROPEGRADE_SELF_REF");

        std::env::set_var("_ROPEGRADE_A", "a");
        std::env::set_var("_ROPEGRADE_B", "b");
        assert_eq!(resolve_env_vars("${_ROPEGRADE_A}-${_ROPEGRADE_B}"), "a-b");
        assert_eq!(resolve_env_vars("${_ROPEGRADE_UNSET_VAR}/x"), "/x");
        std::env::remove_var("_ROPEGRADE_A");
        std::env::remove_var("_ROPEGRADE_B");
    }

    #[test]
    fn default_config() {
        let config = RopegradeConfig::default();
        assert_eq!(config.parallelism, 4);
        assert_eq!(config.max_retries, 3);
        assert!(!config.evaluator.history_rules);
        assert!(matches!(config.store, StoreConfig::Json { .. }));
    }

    #[test]
    fn parse_full_config() {
        let config = parse_config(
            r#"
parallelism = 8
retry_delay_ms = 50

[store]
type = "json"
dir = "/var/lib/ropegrade"

[evaluator]
history_rules = true

[evaluator.knots]
ids = [43, 143]
terms = ["čvor"]
"#,
        )
        .unwrap();
        assert_eq!(config.parallelism, 8);
        assert_eq!(
            config.store,
            StoreConfig::Json {
                dir: PathBuf::from("/var/lib/ropegrade")
            }
        );
        assert!(config.evaluator.history_rules);
        assert_eq!(config.evaluator.knots.ids, vec![43, 143]);
        // Untouched sections keep their defaults.
        assert_eq!(config.evaluator.systems.ids, vec![44]);

        let engine = config.engine_config();
        assert_eq!(engine.parallelism, 8);
        assert_eq!(engine.retry_delay, Duration::from_millis(50));
    }

    #[test]
    fn memory_store_config() {
        let config = parse_config("[store]\ntype = \"memory\"\n").unwrap();
        assert_eq!(config.store, StoreConfig::Memory);
        let store = create_store(&config.store).unwrap();
        assert_eq!(store.name(), "memory");
    }

    #[test]
    fn unknown_store_type_is_rejected() {
        assert!(parse_config("[store]\ntype = \"postgres\"\n").is_err());
    }

    #[test]
    fn data_dir_override_wins() {
        let config = RopegradeConfig {
            store: StoreConfig::Memory,
            ..Default::default()
        }
        .finish(Some("/tmp/override".to_string()));
        assert_eq!(
            config.store,
            StoreConfig::Json {
                dir: PathBuf::from("/tmp/override")
            }
        );

        let untouched = RopegradeConfig::default().finish(Some("  ".to_string()));
        assert_eq!(untouched.store, StoreConfig::default());
    }

    #[test]
    fn explicit_missing_path_errors() {
        let err = load_config_from(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn explicit_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ropegrade.toml");
        std::fs::write(&path, "max_retries = 0\n[store]\ntype = \"memory\"\n").unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.max_retries, 0);
    }

    #[test]
    fn json_store_is_created_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("nested").join("data");
        let store = create_store(&StoreConfig::Json { dir: data.clone() }).unwrap();
        assert_eq!(store.name(), "json");
        assert!(data.is_dir());
    }
}
