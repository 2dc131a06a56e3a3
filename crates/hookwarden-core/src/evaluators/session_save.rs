//! Session persistence evaluator (Stop)

use std::time::SystemTime;
use tracing::debug;

use super::InvocationContext;
use crate::config::{Config, SessionMemoryConfig};
use crate::decision::Decision;
use crate::error::Result;
use crate::event::HookEvent;
use crate::git::ChangeSource;
use crate::session::{RetentionPolicy, SessionContext, SessionStore};

/// Capture the session context, write it as a new artifact, then evict
///
/// Failing to write the artifact is fatal; eviction problems are not.
pub async fn evaluate_session_save(
    event: &HookEvent,
    config: &Config,
    ctx: &InvocationContext,
    changes: &dyn ChangeSource,
) -> Result<Decision> {
    let stop = event.as_stop()?;
    let memory = match config.session_memory.as_ref().filter(|m| m.enabled) {
        Some(memory) => memory,
        None => return Ok(Decision::pass()),
    };
    if stop.stop_hook_active {
        return Ok(Decision::pass());
    }

    let context = capture(memory, ctx, changes).await;
    let store = SessionStore::new(memory.storage_dir());
    let path = store.save(&context, ctx.now)?;

    let report = RetentionPolicy::from(memory).evict(store.dir(), SystemTime::from(ctx.now));
    debug!(deleted = report.deleted(), "old sessions evicted");

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Decision::pass_with(format!(
        "💾 Session context saved to {}",
        file_name
    )))
}

async fn capture(
    memory: &SessionMemoryConfig,
    ctx: &InvocationContext,
    changes: &dyn ChangeSource,
) -> SessionContext {
    let include = memory.include();
    let mut context = SessionContext::new(ctx.project_name.clone(), ctx.now);
    if include.cwd {
        context.cwd = Some(ctx.project_dir.display().to_string());
    }
    if include.git_branch {
        context.git_branch = changes.current_branch().await;
    }
    if include.recent_files {
        context.recent_files = Some(changes.recent_files().await);
    }
    if include.custom_context {
        context.custom_context = ctx.notes.clone();
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockChangeSource;
    use crate::session::artifact_file_name;
    use serde_json::json;
    use tempfile::TempDir;

    fn stop(active: bool) -> HookEvent {
        HookEvent::from_value(json!({"hookEventName": "Stop", "stopHookActive": active})).unwrap()
    }

    // artifacts are aged against the real clock, so the invocation uses it too
    fn ctx() -> InvocationContext {
        InvocationContext::new("/work/api")
    }

    fn workspace() -> MockChangeSource {
        let mut changes = MockChangeSource::new();
        changes
            .expect_current_branch()
            .returning(|| Some("feature/login".to_string()));
        changes
            .expect_recent_files()
            .returning(|| vec!["src/login.ts".to_string()]);
        changes
    }

    #[tokio::test]
    async fn test_disabled_or_reentrant_passes_silently() {
        let changes = MockChangeSource::new();
        let decision = evaluate_session_save(&stop(false), &Config::default(), &ctx(), &changes)
            .await
            .unwrap();
        assert_eq!(decision, Decision::pass());

        let dir = TempDir::new().unwrap();
        let config = Config::from_value(json!({"sessionMemory": {
            "enabled": true, "storageDir": dir.path()
        }}))
        .unwrap();
        let decision = evaluate_session_save(&stop(true), &config, &ctx(), &changes)
            .await
            .unwrap();
        assert_eq!(decision, Decision::pass());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_saves_artifact_with_default_includes() {
        let dir = TempDir::new().unwrap();
        let storage = dir.path().join("sessions");
        let config = Config::from_value(json!({"sessionMemory": {
            "enabled": true, "storageDir": storage
        }}))
        .unwrap();

        let ctx = ctx();
        let file_name = artifact_file_name("api", ctx.now);
        let decision = evaluate_session_save(&stop(false), &config, &ctx, &workspace())
            .await
            .unwrap();
        assert_eq!(
            decision.message(),
            Some(format!("💾 Session context saved to {}", file_name).as_str())
        );

        let body = std::fs::read_to_string(storage.join(&file_name)).unwrap();
        let saved: SessionContext = serde_json::from_str(&body).unwrap();
        assert_eq!(saved.cwd.as_deref(), Some("/work/api"));
        assert_eq!(saved.git_branch.as_deref(), Some("feature/login"));
        assert_eq!(saved.recent_files, Some(vec!["src/login.ts".to_string()]));
        assert!(saved.custom_context.is_none());
    }

    #[tokio::test]
    async fn test_explicit_include_and_notes() {
        let dir = TempDir::new().unwrap();
        let config = Config::from_value(json!({"sessionMemory": {
            "enabled": true,
            "storageDir": dir.path(),
            "include": {"customContext": true}
        }}))
        .unwrap();
        let ctx = ctx().with_notes(Some("halfway through auth refactor".into()));

        evaluate_session_save(&stop(false), &config, &ctx, &MockChangeSource::new())
            .await
            .unwrap();
        let saved = SessionStore::new(dir.path()).latest("api").unwrap();
        assert!(saved.cwd.is_none());
        assert!(saved.git_branch.is_none());
        assert_eq!(saved.custom_context.as_deref(), Some("halfway through auth refactor"));
    }

    #[tokio::test]
    async fn test_save_caps_artifacts() {
        let dir = TempDir::new().unwrap();
        for i in 0..3 {
            std::fs::write(dir.path().join(format!("old-{}.json", i)), "{}").unwrap();
        }
        let config = Config::from_value(json!({"sessionMemory": {
            "enabled": true, "storageDir": dir.path(), "maxSessions": 2
        }}))
        .unwrap();
        evaluate_session_save(&stop(false), &config, &ctx(), &workspace())
            .await
            .unwrap();
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_unwritable_storage_is_fatal() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();
        let config = Config::from_value(json!({"sessionMemory": {
            "enabled": true, "storageDir": blocker.join("sessions")
        }}))
        .unwrap();
        let result = evaluate_session_save(&stop(false), &config, &ctx(), &workspace()).await;
        assert!(result.is_err());
    }
}
