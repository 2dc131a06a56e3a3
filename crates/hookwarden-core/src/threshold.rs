//! Commit-size threshold combinator
//!
//! Two predicates are derived from the measured [`ChangeMetrics`]: files
//! exceeded (`changed_files >= max_files`) and lines exceeded
//! (`changed_lines + untracked_lines >= max_lines`). The configured
//! [`CommitLogic`] combines them.

use serde::{Deserialize, Serialize};

use crate::config::{CommitLogic, ThresholdConfig};

/// Default block message template
pub const DEFAULT_BLOCK_REASON: &str = "There are too many changes {changedFiles}/{maxChangedFiles} changed files and {totalChangedLines}/{maxChangedLines} changed lines in the working directory. Please review and commit your changes before proceeding.";

/// Aggregate working-tree modification size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeMetrics {
    pub changed_files: u64,
    pub changed_lines: u64,
    pub untracked_lines: u64,
}

impl ChangeMetrics {
    pub fn total_lines(&self) -> u64 {
        self.changed_lines + self.untracked_lines
    }
}

/// Resolved thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub max_files: u64,
    pub max_lines: u64,
    pub logic: CommitLogic,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_files: ThresholdConfig::DEFAULT_MAX_FILES,
            max_lines: ThresholdConfig::DEFAULT_MAX_LINES,
            logic: CommitLogic::Or,
        }
    }
}

impl From<&ThresholdConfig> for Thresholds {
    fn from(config: &ThresholdConfig) -> Self {
        Self {
            max_files: config.max_files(),
            max_lines: config.max_lines(),
            logic: config.logic(),
        }
    }
}

/// Outcome of applying [`Thresholds`] to measured metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdVerdict {
    pub files_exceeded: bool,
    pub lines_exceeded: bool,
    pub blocked: bool,
}

impl Thresholds {
    pub fn evaluate(&self, metrics: &ChangeMetrics) -> ThresholdVerdict {
        let files_exceeded = metrics.changed_files >= self.max_files;
        let lines_exceeded = metrics.total_lines() >= self.max_lines;
        let blocked = match self.logic {
            CommitLogic::And => files_exceeded && lines_exceeded,
            CommitLogic::Or => files_exceeded || lines_exceeded,
        };
        ThresholdVerdict {
            files_exceeded,
            lines_exceeded,
            blocked,
        }
    }

    /// Fill the named placeholders of `template`
    ///
    /// Placeholders missing from the template are simply not used; unknown
    /// ones are left untouched.
    pub fn render(&self, template: &str, metrics: &ChangeMetrics) -> String {
        let values = [
            ("{changedFiles}", metrics.changed_files),
            ("{maxChangedFiles}", self.max_files),
            ("{changedLines}", metrics.changed_lines),
            ("{untrackedLines}", metrics.untracked_lines),
            ("{totalChangedLines}", metrics.total_lines()),
            ("{maxChangedLines}", self.max_lines),
        ];
        values
            .iter()
            .fold(template.to_string(), |text, (placeholder, value)| {
                text.replace(placeholder, &value.to_string())
            })
    }
}
