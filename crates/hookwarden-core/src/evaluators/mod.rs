//! Hook evaluators
//!
//! One evaluator per hook. Each is a function of the event, the merged
//! [`Config`](crate::config::Config), an [`InvocationContext`] and the
//! signal sources it needs, and yields exactly one
//! [`Decision`](crate::decision::Decision). Evaluators never call each other.

pub mod commit;
pub mod format;
pub mod guard;
pub mod learn;
pub mod session_load;
pub mod session_save;

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

pub use commit::evaluate_commit;
pub use format::evaluate_format;
pub use guard::evaluate_guard;
pub use learn::evaluate_learn;
pub use session_load::evaluate_session_load;
pub use session_save::evaluate_session_save;

/// Environment variable set by terminal multiplexers
pub const MULTIPLEXER_ENV: &str = "TMUX";

const FALLBACK_PROJECT_NAME: &str = "project";

/// Per-invocation facts that are not part of the event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    /// Working tree the hook runs for
    pub project_dir: PathBuf,
    /// Last component of `project_dir`, used to key session artifacts
    pub project_name: String,
    /// Whether the agent already runs inside a terminal multiplexer
    pub in_multiplexer: bool,
    pub now: DateTime<Utc>,
    /// Free-text notes stored with a saved session
    pub notes: Option<String>,
}

impl InvocationContext {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        let project_dir = project_dir.into();
        let project_name = project_name(&project_dir);
        Self {
            project_dir,
            project_name,
            in_multiplexer: false,
            now: Utc::now(),
            notes: None,
        }
    }

    /// Pick up the multiplexer flag from the process environment
    pub fn from_env(project_dir: impl Into<PathBuf>) -> Self {
        Self::new(project_dir).with_multiplexer(std::env::var_os(MULTIPLEXER_ENV).is_some())
    }

    pub fn with_multiplexer(mut self, in_multiplexer: bool) -> Self {
        self.in_multiplexer = in_multiplexer;
        self
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes.filter(|n| !n.trim().is_empty());
        self
    }

    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }
}

fn project_name(dir: &Path) -> String {
    dir.file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(FALLBACK_PROJECT_NAME)
        .to_string()
}
