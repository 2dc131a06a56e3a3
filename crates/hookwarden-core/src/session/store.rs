//! Session artifact storage

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{artifact_file_name, list_artifacts, SessionContext};
use crate::error::Result;

/// Directory of session artifacts shared by all projects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `context` as a new artifact stamped with `at`
    ///
    /// The directory is created when missing. Any failure to create or
    /// write is returned to the caller.
    pub fn save(&self, context: &SessionContext, at: DateTime<Utc>) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(artifact_file_name(&context.project, at));
        let body = serde_json::to_string_pretty(context)?;
        std::fs::write(&path, body)?;
        info!(path = %path.display(), "session context saved");
        Ok(path)
    }

    /// Most recently modified artifact whose project part starts with `project`
    ///
    /// Only the newest candidate is read. If it cannot be read or parsed the
    /// lookup reports no session, even when older candidates exist.
    pub fn latest(&self, project: &str) -> Option<SessionContext> {
        let artifacts = match list_artifacts(&self.dir) {
            Ok(artifacts) => artifacts,
            Err(e) => {
                warn!(dir = %self.dir.display(), error = %e, "cannot list session artifacts");
                return None;
            }
        };
        let newest = artifacts
            .into_iter()
            .find(|artifact| artifact.project.starts_with(project))?;

        let content = match std::fs::read_to_string(&newest.path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %newest.path.display(), error = %e, "latest session unreadable");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(context) => Some(context),
            Err(e) => {
                warn!(path = %newest.path.display(), error = %e, "latest session is not valid");
                None
            }
        }
    }
}
