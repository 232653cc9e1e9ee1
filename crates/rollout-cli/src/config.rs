//! Project and user configuration.
//!
//! Project settings live in `.rollout/config.toml`; user settings in the
//! platform config dir under `rollout/config.toml`. Both are optional and
//! every field has a default, so a missing or partial file just works.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// Geometry of the windowed item table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_row_height")]
    pub row_height: u64,
    #[serde(default = "default_visible_rows")]
    pub visible_rows: usize,
    #[serde(default = "default_buffer_rows")]
    pub buffer_rows: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            row_height: default_row_height(),
            visible_rows: default_visible_rows(),
            buffer_rows: default_buffer_rows(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_file")]
    pub file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            file: default_store_file(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

const fn default_row_height() -> u64 {
    1
}

const fn default_visible_rows() -> usize {
    20
}

const fn default_buffer_rows() -> usize {
    4
}

fn default_store_file() -> String {
    "store.json".to_string()
}

pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = project_root.join(".rollout/config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("rollout/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Path of the session file for a project root.
pub fn store_path(project_root: &Path, config: &ProjectConfig) -> PathBuf {
    project_root.join(".rollout").join(&config.store.file)
}
