//! Configuration model
//!
//! Every option is optional; accessors on each section resolve the
//! documented defaults. A [`Config`] is built once per invocation from the
//! merged project and local documents and handed to the evaluator by
//! parameter.

pub mod loader;
pub mod merge;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::error::{HookError, Result};

pub use loader::ConfigLoader;
pub use merge::deep_merge;

/// Merged configuration for all evaluators
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub commit: Option<CommitConfig>,
    #[serde(default)]
    pub format: Option<FormatConfig>,
    #[serde(default)]
    pub guard: Option<GuardConfig>,
    #[serde(default)]
    pub session_memory: Option<SessionMemoryConfig>,
    #[serde(default)]
    pub learning: Option<LearningConfig>,
}

impl Config {
    /// Decode an already merged document
    pub fn from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value).map_err(|e| HookError::config(e.to_string()))
    }

    /// Merge a project document with a local override and decode the result
    pub fn from_layers(project: Value, local: Value) -> Result<Self> {
        Self::from_value(deep_merge(project, local))
    }
}

/// How the two threshold predicates are combined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitLogic {
    #[serde(rename = "AND")]
    And,
    #[default]
    #[serde(rename = "OR")]
    Or,
}

/// Commit-size policy applied when the agent stops
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitConfig {
    #[serde(default)]
    pub threshold: ThresholdConfig,
    #[serde(default)]
    pub debug_detection: Option<DebugDetectionConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdConfig {
    #[serde(default)]
    pub enabled: bool,
    pub max_files_changed: Option<u64>,
    pub max_lines_changed: Option<u64>,
    pub logic: Option<CommitLogic>,
    pub block_reason: Option<String>,
}

impl ThresholdConfig {
    pub const DEFAULT_MAX_FILES: u64 = 10;
    pub const DEFAULT_MAX_LINES: u64 = 500;

    pub fn max_files(&self) -> u64 {
        self.max_files_changed.unwrap_or(Self::DEFAULT_MAX_FILES)
    }

    pub fn max_lines(&self) -> u64 {
        self.max_lines_changed.unwrap_or(Self::DEFAULT_MAX_LINES)
    }

    pub fn logic(&self) -> CommitLogic {
        self.logic.unwrap_or_default()
    }
}

/// Debug statement detection over modified files
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugDetectionConfig {
    #[serde(default)]
    pub enabled: bool,
    pub patterns: Option<Vec<String>>,
    pub extensions: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub enforce: Option<bool>,
    pub warn_message: Option<String>,
}

impl DebugDetectionConfig {
    pub const DEFAULT_PATTERNS: &'static [&'static str] = &[
        r"console\.log",
        r"console\.debug",
        r"console\.warn",
        r"console\.info",
        "debugger",
    ];
    pub const DEFAULT_EXTENSIONS: &'static [&'static str] = &["ts", "tsx", "js", "jsx"];

    pub fn patterns(&self) -> Vec<String> {
        self.patterns
            .clone()
            .unwrap_or_else(|| to_owned_list(Self::DEFAULT_PATTERNS))
    }

    pub fn extensions(&self) -> Vec<String> {
        self.extensions
            .clone()
            .unwrap_or_else(|| to_owned_list(Self::DEFAULT_EXTENSIONS))
    }

    pub fn exclude(&self) -> Vec<String> {
        self.exclude.clone().unwrap_or_default()
    }

    pub fn enforce(&self) -> bool {
        self.enforce.unwrap_or(false)
    }
}

/// Formatter and type-checker run after file edits
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatConfig {
    #[serde(default)]
    pub enabled: bool,
    pub prettier: Option<bool>,
    pub tsc: Option<bool>,
    pub prettier_extensions: Option<Vec<String>>,
    pub tsc_extensions: Option<Vec<String>>,
    pub enforce: Option<bool>,
}

impl FormatConfig {
    pub const DEFAULT_PRETTIER_EXTENSIONS: &'static [&'static str] =
        &["ts", "tsx", "js", "jsx", "json", "css", "scss", "html", "md"];
    pub const DEFAULT_TSC_EXTENSIONS: &'static [&'static str] = &["ts", "tsx"];

    pub fn prettier(&self) -> bool {
        self.prettier.unwrap_or(true)
    }

    pub fn tsc(&self) -> bool {
        self.tsc.unwrap_or(true)
    }

    pub fn prettier_extensions(&self) -> Vec<String> {
        self.prettier_extensions
            .clone()
            .unwrap_or_else(|| to_owned_list(Self::DEFAULT_PRETTIER_EXTENSIONS))
    }

    pub fn tsc_extensions(&self) -> Vec<String> {
        self.tsc_extensions
            .clone()
            .unwrap_or_else(|| to_owned_list(Self::DEFAULT_TSC_EXTENSIONS))
    }

    pub fn enforce(&self) -> bool {
        self.enforce.unwrap_or(false)
    }
}

/// Action taken when a guard rule matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Warn,
    Block,
}

/// User-supplied guard rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyRule {
    pub name: String,
    /// Regex over the tool name
    pub tool_pattern: String,
    /// Regex over the serialized tool input
    #[serde(default)]
    pub input_pattern: Option<String>,
    pub action: RuleAction,
    pub message: String,
}

/// PreToolUse guard configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub rules: Option<Vec<PolicyRule>>,
    #[serde(default)]
    pub built_in: Option<BuiltInGuards>,
}

impl GuardConfig {
    pub fn rules(&self) -> &[PolicyRule] {
        self.rules.as_deref().unwrap_or_default()
    }

    pub fn built_in(&self) -> BuiltInGuards {
        self.built_in.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuiltInGuards {
    pub git_push_confirm: Option<bool>,
    pub tmux_reminder: Option<bool>,
}

impl BuiltInGuards {
    pub fn git_push_confirm(&self) -> bool {
        self.git_push_confirm.unwrap_or(false)
    }

    pub fn tmux_reminder(&self) -> bool {
        self.tmux_reminder.unwrap_or(false)
    }
}

/// Session memory persistence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMemoryConfig {
    #[serde(default)]
    pub enabled: bool,
    pub storage_dir: Option<PathBuf>,
    pub retention_days: Option<u64>,
    pub max_sessions: Option<usize>,
    pub include: Option<SessionInclude>,
}

impl SessionMemoryConfig {
    pub const DEFAULT_RETENTION_DAYS: u64 = 7;
    pub const DEFAULT_MAX_SESSIONS: usize = 50;

    /// Storage directory, defaulting to `~/.claude/sessions`
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir
            .clone()
            .unwrap_or_else(|| home_subdir(&[".claude", "sessions"]))
    }

    pub fn retention_days(&self) -> u64 {
        self.retention_days.unwrap_or(Self::DEFAULT_RETENTION_DAYS)
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions.unwrap_or(Self::DEFAULT_MAX_SESSIONS)
    }

    /// Resolved include flags
    ///
    /// Without an `include` section cwd, branch and recent files are
    /// captured. With one, only the flags it sets to true are.
    pub fn include(&self) -> ResolvedInclude {
        match &self.include {
            None => ResolvedInclude {
                cwd: true,
                git_branch: true,
                recent_files: true,
                custom_context: false,
            },
            Some(include) => ResolvedInclude {
                cwd: include.cwd.unwrap_or(false),
                git_branch: include.git_branch.unwrap_or(false),
                recent_files: include.recent_files.unwrap_or(false),
                custom_context: include.custom_context.unwrap_or(false),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInclude {
    pub cwd: Option<bool>,
    pub git_branch: Option<bool>,
    pub recent_files: Option<bool>,
    pub custom_context: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedInclude {
    pub cwd: bool,
    pub git_branch: bool,
    pub recent_files: bool,
    pub custom_context: bool,
}

/// Categories the learning extractor knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LearningCategory {
    ErrorResolution,
    FrameworkWorkaround,
    Debugging,
    Convention,
}

impl LearningCategory {
    pub const ALL: [LearningCategory; 4] = [
        LearningCategory::ErrorResolution,
        LearningCategory::FrameworkWorkaround,
        LearningCategory::Debugging,
        LearningCategory::Convention,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LearningCategory::ErrorResolution => "error-resolution",
            LearningCategory::FrameworkWorkaround => "framework-workaround",
            LearningCategory::Debugging => "debugging",
            LearningCategory::Convention => "convention",
        }
    }
}

/// Continuous learning from session transcripts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningConfig {
    #[serde(default)]
    pub enabled: bool,
    pub min_session_length: Option<usize>,
    pub output_dir: Option<PathBuf>,
    pub categories: Option<Vec<LearningCategory>>,
}

impl LearningConfig {
    pub const DEFAULT_MIN_SESSION_LENGTH: usize = 10;

    pub fn min_session_length(&self) -> usize {
        self.min_session_length
            .unwrap_or(Self::DEFAULT_MIN_SESSION_LENGTH)
    }

    /// Output directory, defaulting to `~/.claude/learned`
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| home_subdir(&[".claude", "learned"]))
    }

    pub fn categories(&self) -> Vec<LearningCategory> {
        self.categories
            .clone()
            .unwrap_or_else(|| LearningCategory::ALL.to_vec())
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn home_subdir(parts: &[&str]) -> PathBuf {
    let base = dirs::home_dir().unwrap_or_else(|| Path::new(".").to_path_buf());
    parts.iter().fold(base, |path, part| path.join(part))
}
