//! Persisted session artifacts
//!
//! Each completed session leaves one immutable JSON file named
//! `{project}-{timestamp}.json` in a shared storage directory. The
//! directory may hold artifacts of many projects.

pub mod retention;
pub mod store;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

pub use retention::{EvictionReport, RetentionPolicy};
pub use store::SessionStore;

/// File extension of session artifacts
pub const ARTIFACT_EXTENSION: &str = "json";

/// Body of a session artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub timestamp: String,
    pub project: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_files: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_context: Option<String>,
}

impl SessionContext {
    pub fn new(project: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            timestamp: iso_timestamp(at),
            project: project.into(),
            cwd: None,
            git_branch: None,
            recent_files: None,
            custom_context: None,
        }
    }

    /// Human-readable summary of the captured context, one fact per line
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(cwd) = &self.cwd {
            lines.push(format!("Working directory: {}", cwd));
        }
        if let Some(branch) = self.git_branch.as_deref().filter(|b| !b.is_empty()) {
            lines.push(format!("Git branch: {}", branch));
        }
        if let Some(files) = self.recent_files.as_ref().filter(|f| !f.is_empty()) {
            lines.push(format!("Recently modified files:\n  • {}", files.join("\n  • ")));
        }
        if let Some(notes) = self.custom_context.as_deref().filter(|n| !n.is_empty()) {
            lines.push(format!("Notes: {}", notes));
        }
        lines
    }
}

/// ISO-8601 timestamp with millisecond precision, e.g. `2026-10-19T08:15:30.123Z`
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Artifact file name for `project` at `at`; colons and dots of the
/// timestamp become dashes
pub fn artifact_file_name(project: &str, at: DateTime<Utc>) -> String {
    let stamp = iso_timestamp(at).replace([':', '.'], "-");
    format!("{}-{}.{}", project, stamp, ARTIFACT_EXTENSION)
}

/// A session artifact found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetainedArtifact {
    pub path: PathBuf,
    /// File stem without the timestamp suffix
    pub project: String,
    pub modified_at: SystemTime,
}

impl RetainedArtifact {
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }

    pub fn modified_at_utc(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from(self.modified_at)
    }
}

/// Shape of the timestamp suffix; `d` stands for an ASCII digit
const STAMP_TEMPLATE: &[u8] = b"dddd-dd-ddTdd-dd-dd-dddZ";

/// Strip the `-{timestamp}` suffix from an artifact file stem
///
/// Stems that do not end in a timestamp are returned unchanged.
pub fn project_from_stem(stem: &str) -> &str {
    let Some(split) = stem.len().checked_sub(STAMP_TEMPLATE.len()) else {
        return stem;
    };
    if !stem.is_char_boundary(split) {
        return stem;
    }
    let (head, stamp) = stem.split_at(split);
    let is_stamp = stamp
        .bytes()
        .zip(STAMP_TEMPLATE.iter())
        .all(|(byte, expected)| match expected {
            b'd' => byte.is_ascii_digit(),
            other => byte == *other,
        });
    match head.strip_suffix('-') {
        Some(project) if is_stamp && !project.is_empty() => project,
        _ => stem,
    }
}

/// List every artifact in `dir`, newest first
///
/// A missing directory yields no artifacts. Entries whose metadata cannot
/// be read (for instance removed concurrently) are skipped.
pub fn list_artifacts(dir: &Path) -> std::io::Result<Vec<RetainedArtifact>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut artifacts = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(ARTIFACT_EXTENSION) {
            continue;
        }
        let modified_at = match entry.metadata().and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping artifact without metadata");
                continue;
            }
        };
        let project = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(project_from_stem)
            .unwrap_or_default()
            .to_string();
        artifacts.push(RetainedArtifact {
            path,
            project,
            modified_at,
        });
    }
    artifacts.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
    Ok(artifacts)
}
