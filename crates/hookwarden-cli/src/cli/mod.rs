//! CLI module for Hookwarden
//!
//! Resolves the project root, loads the layered configuration, decodes the
//! event, runs the evaluator selected by the subcommand and encodes the
//! decision. Any failure before a decision exists is reported on stderr and
//! mapped to a non-zero [`ExitCode`]; nothing is written to stdout then.

pub mod commands;

pub use commands::{HookCommand, HookwardenCli};

use anyhow::{Context, Result};
use hookwarden_core::evaluators::{
    evaluate_commit, evaluate_format, evaluate_guard, evaluate_learn, evaluate_session_load,
    evaluate_session_save,
};
use hookwarden_core::{
    ConfigLoader, GitWorkspace, HookError, HookEvent, InvocationContext, TokioProcessRunner,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// A decision was emitted, whether pass or block
    Success = 0,
    /// Malformed event, configuration or pattern
    InvalidInput = 3,
    /// Event or artifact I/O failed
    FileError = 4,
    /// Internal error
    InternalError = 10,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl ExitCode {
    /// Classify a failed invocation
    pub fn from_error(err: &anyhow::Error) -> Self {
        if let Some(hook) = err.downcast_ref::<HookError>() {
            return match hook {
                HookError::Io(_) => ExitCode::FileError,
                other if other.is_user_error() => ExitCode::InvalidInput,
                _ => ExitCode::InternalError,
            };
        }
        if err.downcast_ref::<std::io::Error>().is_some() {
            ExitCode::FileError
        } else {
            ExitCode::InternalError
        }
    }
}

/// Project root: the explicit directory, else the working directory
pub fn resolve_project_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    let dir = match explicit {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().context("Failed to determine the working directory")?,
    };
    Ok(dir.canonicalize().unwrap_or(dir))
}

/// Evaluate one raw event payload and return the encoded decision
pub async fn execute(command: &HookCommand, project_dir: &Path, raw_event: &str) -> Result<String> {
    let config = ConfigLoader::new(project_dir)
        .load()
        .context("Failed to load configuration")?;
    let event = HookEvent::from_json(raw_event).context("Failed to read hook event")?;

    let notes = match command {
        HookCommand::SessionSave { notes } => notes.clone(),
        _ => None,
    };
    let ctx = InvocationContext::from_env(project_dir).with_notes(notes);
    debug!(hook = command.name(), event = %event.name(), project = %ctx.project_name, "evaluating");

    let decision = match command {
        HookCommand::Commit => {
            evaluate_commit(&event, &config, &ctx, &GitWorkspace::new(project_dir)).await
        }
        HookCommand::Guard => evaluate_guard(&event, &config, &ctx).await,
        HookCommand::Format => {
            evaluate_format(&event, &config, &ctx, Arc::new(TokioProcessRunner)).await
        }
        HookCommand::SessionSave { .. } => {
            evaluate_session_save(&event, &config, &ctx, &GitWorkspace::new(project_dir)).await
        }
        HookCommand::SessionLoad => evaluate_session_load(&event, &config, &ctx).await,
        HookCommand::Learn => evaluate_learn(&event, &config, &ctx).await,
    }
    .with_context(|| format!("{} hook failed", command.name()))?;

    Ok(decision.to_json(event.name())?)
}

/// Run the CLI with the given arguments and event payload
pub async fn run(cli: &HookwardenCli, raw_event: &str) -> Result<String> {
    let project_dir = resolve_project_dir(cli.project_dir.as_deref())?;
    execute(&cli.command, &project_dir, raw_event).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn project(config: Value) -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("claudekit.config.json"), config.to_string()).unwrap();
        dir
    }

    #[test]
    fn test_exit_code_conversion() {
        assert_eq!(i32::from(ExitCode::Success), 0);
        assert_eq!(i32::from(ExitCode::InvalidInput), 3);
        assert_eq!(i32::from(ExitCode::FileError), 4);
        assert_eq!(i32::from(ExitCode::InternalError), 10);
    }

    #[test]
    fn test_exit_code_from_error() {
        let config = anyhow::Error::new(HookError::config("bad")).context("loading");
        assert_eq!(ExitCode::from_error(&config), ExitCode::InvalidInput);

        let io = anyhow::Error::new(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert_eq!(ExitCode::from_error(&io), ExitCode::FileError);

        let hook_io = anyhow::Error::new(HookError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        )));
        assert_eq!(ExitCode::from_error(&hook_io), ExitCode::FileError);

        assert_eq!(
            ExitCode::from_error(&anyhow::anyhow!("boom")),
            ExitCode::InternalError
        );
    }

    #[tokio::test]
    async fn test_guard_blocks_dangerous_command() {
        let dir = project(json!({"guard": {"enabled": true}}));
        let output = execute(
            &HookCommand::Guard,
            dir.path(),
            r#"{"hook_event_name":"PreToolUse","tool_name":"Bash","tool_input":{"command":"rm -rf ~"}}"#,
        )
        .await
        .unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["decision"], "block");
        assert!(!output.contains('\n'));
    }

    #[tokio::test]
    async fn test_silent_pass_is_empty_object() {
        let dir = TempDir::new().unwrap();
        let output = execute(
            &HookCommand::SessionLoad,
            dir.path(),
            r#"{"hookEventName":"SessionStart"}"#,
        )
        .await
        .unwrap();
        assert_eq!(output, "{}");
    }

    #[tokio::test]
    async fn test_local_override_cannot_lift_dangerous_rm_block() {
        let dir = project(json!({"guard": {"enabled": true}}));
        std::fs::write(
            dir.path().join("claudekit.local.json"),
            json!({"guard": {"builtIn": {"dangerousRm": false, "gitPushConfirm": true}}}).to_string(),
        )
        .unwrap();
        let blocked = execute(
            &HookCommand::Guard,
            dir.path(),
            r#"{"hookEventName":"PreToolUse","toolName":"Bash","toolInput":{"command":"rm -rf ~"}}"#,
        )
        .await
        .unwrap();
        let value: Value = serde_json::from_str(&blocked).unwrap();
        assert_eq!(value["decision"], "block");

        // the rest of the local layer still applies
        let warned = execute(
            &HookCommand::Guard,
            dir.path(),
            r#"{"hookEventName":"PreToolUse","toolName":"Bash","toolInput":{"command":"git push"}}"#,
        )
        .await
        .unwrap();
        let value: Value = serde_json::from_str(&warned).unwrap();
        assert!(value.get("decision").is_none());
        assert!(value["reason"].as_str().unwrap().contains("Git Push"));
    }

    #[tokio::test]
    async fn test_malformed_inputs_are_user_errors() {
        let dir = project(json!({"guard": {"enabled": true}}));
        let err = execute(&HookCommand::Guard, dir.path(), "not json")
            .await
            .unwrap_err();
        assert_eq!(ExitCode::from_error(&err), ExitCode::InvalidInput);

        let broken = TempDir::new().unwrap();
        std::fs::write(broken.path().join("claudekit.json"), "{ nope").unwrap();
        let err = execute(&HookCommand::Guard, broken.path(), r#"{"hookEventName":"Stop"}"#)
            .await
            .unwrap_err();
        assert_eq!(ExitCode::from_error(&err), ExitCode::InvalidInput);
    }

    #[tokio::test]
    async fn test_wrong_event_for_hook() {
        let dir = project(json!({}));
        let err = execute(&HookCommand::Guard, dir.path(), r#"{"hookEventName":"Stop"}"#)
            .await
            .unwrap_err();
        assert_eq!(ExitCode::from_error(&err), ExitCode::InvalidInput);
    }

    #[test]
    fn test_resolve_explicit_project_dir() {
        let dir = TempDir::new().unwrap();
        let resolved = resolve_project_dir(Some(dir.path())).unwrap();
        assert_eq!(resolved, dir.path().canonicalize().unwrap());
    }
}
