//! Configuration file discovery
//!
//! Looks for a project document and a local override under the project
//! root, in fixed precedence order, and merges them.

use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::Config;
use crate::error::{HookError, Result};

/// Environment variable naming the project root
pub const PROJECT_DIR_ENV: &str = "CLAUDE_PROJECT_DIR";

/// Project documents, first match wins
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "claudekit.config.json",
    "claudekit.json",
    ".claude/claudekit.config.json",
    ".claude/claudekit.json",
];

/// Local override documents, first match wins
pub const LOCAL_CONFIG_SEARCH_PATHS: &[&str] =
    &["claudekit.local.json", ".claude/claudekit.local.json"];

/// Discovers and merges the configuration layers of one project
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    project_root: PathBuf,
}

impl ConfigLoader {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Path of the project document, if one exists
    pub fn project_config_path(&self) -> Option<PathBuf> {
        self.find_first(CONFIG_SEARCH_PATHS)
    }

    /// Path of the local override, if one exists
    pub fn local_config_path(&self) -> Option<PathBuf> {
        self.find_first(LOCAL_CONFIG_SEARCH_PATHS)
    }

    /// Load both layers and merge them; missing files are empty layers
    pub fn load(&self) -> Result<Config> {
        let project = read_layer(self.project_config_path())?;
        let local = read_layer(self.local_config_path())?;
        Config::from_layers(project, local)
    }

    fn find_first(&self, candidates: &[&str]) -> Option<PathBuf> {
        candidates
            .iter()
            .map(|candidate| self.project_root.join(candidate))
            .find(|path| path.is_file())
    }
}

fn read_layer(path: Option<PathBuf>) -> Result<Value> {
    let Some(path) = path else {
        return Ok(Value::Object(Default::default()));
    };
    debug!(path = %path.display(), "loading config layer");
    let content = std::fs::read_to_string(&path).map_err(|e| {
        HookError::config(format!("Failed to read config file at {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        HookError::config(format!("Failed to parse config file at {}: {}", path.display(), e))
    })
}
