//! Two-pass eviction of session artifacts
//!
//! Pass 1 deletes every artifact, across all projects, older than the
//! retention window. Pass 2 then keeps only the `max_sessions` most recently
//! modified of what remains. Deletion failures are logged and skipped; both
//! passes always run to completion, and re-running against a compliant
//! directory deletes nothing.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

use super::{list_artifacts, RetainedArtifact};
use crate::config::SessionMemoryConfig;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Retention window and artifact cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub retention: Duration,
    pub max_sessions: usize,
}

/// Artifacts removed by one eviction run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvictionReport {
    /// Removed by the age pass
    pub expired: Vec<PathBuf>,
    /// Removed by the count pass
    pub overflow: Vec<PathBuf>,
    /// Deletions that failed and were skipped
    pub failed: usize,
}

impl EvictionReport {
    pub fn deleted(&self) -> usize {
        self.expired.len() + self.overflow.len()
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::new(
            SessionMemoryConfig::DEFAULT_RETENTION_DAYS,
            SessionMemoryConfig::DEFAULT_MAX_SESSIONS,
        )
    }
}

impl From<&SessionMemoryConfig> for RetentionPolicy {
    fn from(config: &SessionMemoryConfig) -> Self {
        Self::new(config.retention_days(), config.max_sessions())
    }
}

impl RetentionPolicy {
    pub fn new(retention_days: u64, max_sessions: usize) -> Self {
        Self {
            retention: Duration::from_secs(retention_days.saturating_mul(SECONDS_PER_DAY)),
            max_sessions,
        }
    }

    /// Whether `artifact` has outlived the retention window at `now`
    pub fn is_expired(&self, artifact: &RetainedArtifact, now: SystemTime) -> bool {
        now.duration_since(artifact.modified_at)
            .map(|age| age > self.retention)
            .unwrap_or(false)
    }

    /// Run both passes over `dir`
    pub fn evict(&self, dir: &Path, now: SystemTime) -> EvictionReport {
        let mut report = EvictionReport::default();

        for artifact in self.list(dir) {
            if self.is_expired(&artifact, now) {
                if remove(&artifact) {
                    report.expired.push(artifact.path);
                } else {
                    report.failed += 1;
                }
            }
        }

        let remaining = self.list(dir);
        if remaining.len() > self.max_sessions {
            // newest first, so everything past the cap is the oldest
            for artifact in remaining.into_iter().skip(self.max_sessions) {
                if remove(&artifact) {
                    report.overflow.push(artifact.path);
                } else {
                    report.failed += 1;
                }
            }
        }

        debug!(
            expired = report.expired.len(),
            overflow = report.overflow.len(),
            failed = report.failed,
            "session eviction finished"
        );
        report
    }

    fn list(&self, dir: &Path) -> Vec<RetainedArtifact> {
        list_artifacts(dir).unwrap_or_else(|e| {
            warn!(dir = %dir.display(), error = %e, "cannot list session artifacts");
            Vec::new()
        })
    }
}

fn remove(artifact: &RetainedArtifact) -> bool {
    match std::fs::remove_file(&artifact.path) {
        Ok(()) => true,
        Err(e) => {
            warn!(path = %artifact.path.display(), error = %e, "failed to delete session artifact");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn days(n: u64) -> Duration {
        Duration::from_secs(n * SECONDS_PER_DAY)
    }

    fn artifact_aged(dir: &Path, name: &str, now: SystemTime, age: Duration) -> PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        file.set_modified(now - age).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let policy = RetentionPolicy::default();
        assert_eq!(policy.retention, days(7));
        assert_eq!(policy.max_sessions, 50);
    }

    #[test]
    fn test_age_then_count() {
        let dir = TempDir::new().unwrap();
        let now = SystemTime::now();
        for age in 1..=10u64 {
            artifact_aged(dir.path(), &format!("proj-{}.json", age), now, days(age));
        }

        let report = RetentionPolicy::new(7, 5).evict(dir.path(), now);
        assert_eq!(report.expired.len(), 3);
        assert_eq!(report.overflow.len(), 2);
        assert_eq!(report.failed, 0);

        let mut left: Vec<_> = list_artifacts(dir.path())
            .unwrap()
            .into_iter()
            .map(|a| a.file_name().to_string())
            .collect();
        left.sort();
        assert_eq!(
            left,
            vec!["proj-1.json", "proj-2.json", "proj-3.json", "proj-4.json", "proj-5.json"]
        );
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let now = SystemTime::now();
        for age in 1..=4u64 {
            artifact_aged(dir.path(), &format!("p-{}.json", age), now, days(age));
        }
        let policy = RetentionPolicy::new(7, 5);
        assert_eq!(policy.evict(dir.path(), now).deleted(), 0);
        assert_eq!(policy.evict(dir.path(), now).deleted(), 0);
        assert_eq!(list_artifacts(dir.path()).unwrap().len(), 4);
    }

    #[test]
    fn test_ignores_non_artifacts() {
        let dir = TempDir::new().unwrap();
        let now = SystemTime::now();
        artifact_aged(dir.path(), "old.json", now, days(30));
        let notes = artifact_aged(dir.path(), "notes.md", now, days(30));

        let report = RetentionPolicy::new(7, 50).evict(dir.path(), now);
        assert_eq!(report.expired.len(), 1);
        assert!(notes.exists());
    }

    #[test]
    fn test_missing_dir_is_noop() {
        let dir = TempDir::new().unwrap();
        let report = RetentionPolicy::default().evict(&dir.path().join("nope"), SystemTime::now());
        assert_eq!(report, EvictionReport::default());
    }

    #[test]
    fn test_window_is_exclusive() {
        let now = SystemTime::now();
        let policy = RetentionPolicy::new(7, 50);
        let at_edge = RetainedArtifact {
            path: PathBuf::from("p.json"),
            project: "p".into(),
            modified_at: now - days(7),
        };
        assert!(!policy.is_expired(&at_edge, now));
        let past = RetainedArtifact {
            modified_at: now - days(7) - Duration::from_secs(1),
            ..at_edge
        };
        assert!(policy.is_expired(&past, now));
    }
}
