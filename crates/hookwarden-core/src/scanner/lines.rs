//! Line-oriented regex scanner

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::{has_extension, ScanIssue, ScanReport};
use crate::config::DebugDetectionConfig;
use crate::error::{HookError, Result};

/// A line that matched one of the configured patterns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugMatch {
    pub file: String,
    /// 1-based line number
    pub line: usize,
    /// Trimmed line text
    pub content: String,
    /// The matched substring
    pub pattern: String,
}

/// Scans files line by line for any of a set of patterns
#[derive(Debug, Clone)]
pub struct LineScanner {
    pattern: Regex,
    extensions: Vec<String>,
    exclude: Vec<String>,
}

impl LineScanner {
    /// Compile the patterns into one alternation
    pub fn new(patterns: &[String], extensions: Vec<String>, exclude: Vec<String>) -> Result<Self> {
        if patterns.is_empty() {
            return Err(HookError::config("debug detection needs at least one pattern"));
        }
        for pattern in patterns {
            Regex::new(pattern)
                .map_err(|e| HookError::invalid_pattern("debug detection", pattern.as_str(), &e))?;
        }
        let joined = format!("({})", patterns.join("|"));
        let pattern = Regex::new(&joined)
            .map_err(|e| HookError::invalid_pattern("debug detection", joined.as_str(), &e))?;
        Ok(Self {
            pattern,
            extensions,
            exclude,
        })
    }

    pub fn from_config(config: &DebugDetectionConfig) -> Result<Self> {
        Self::new(&config.patterns(), config.extensions(), config.exclude())
    }

    /// Whether `file` is in scope (accepted extension, not excluded)
    pub fn accepts(&self, file: &str) -> bool {
        has_extension(file, &self.extensions)
            && !self.exclude.iter().any(|excluded| file.contains(excluded.as_str()))
    }

    /// Every matching line of `content`, in order
    pub fn scan_text(&self, file: &str, content: &str) -> Vec<DebugMatch> {
        content
            .lines()
            .enumerate()
            .filter_map(|(index, line)| {
                self.pattern.find(line).map(|found| DebugMatch {
                    file: file.to_string(),
                    line: index + 1,
                    content: line.trim().to_string(),
                    pattern: found.as_str().to_string(),
                })
            })
            .collect()
    }

    /// Scan the in-scope files among `files`, resolved against `root`
    ///
    /// Unreadable files (deleted, permission denied) are skipped. Invalid
    /// UTF-8 is decoded lossily so the remaining lines are still scanned.
    pub async fn scan_files(&self, root: &Path, files: &[String]) -> ScanReport {
        let mut report = ScanReport::default();
        for file in files.iter().filter(|f| self.accepts(f)) {
            match tokio::fs::read(root.join(file)).await {
                Ok(bytes) => report.issues.extend(
                    self.scan_text(file, &String::from_utf8_lossy(&bytes))
                        .into_iter()
                        .map(ScanIssue::DebugStatement),
                ),
                Err(e) => debug!(file = %file, error = %e, "skipping unreadable file"),
            }
        }
        report
    }
}

/// Render matches as a bullet list, one line per match
pub fn format_matches<'a>(matches: impl IntoIterator<Item = &'a DebugMatch>) -> String {
    matches
        .into_iter()
        .map(|m| format!("  • {}:{} - {}", m.file, m.line, m.pattern))
        .collect::<Vec<_>>()
        .join("\n")
}
