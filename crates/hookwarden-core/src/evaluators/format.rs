//! Formatter and type-check evaluator (PostToolUse)

use std::sync::Arc;
use tracing::debug;

use super::InvocationContext;
use crate::config::Config;
use crate::decision::Decision;
use crate::error::Result;
use crate::event::HookEvent;
use crate::process::ProcessRunner;
use crate::scanner::ToolScanner;

/// Tools whose output is checked
pub const FILE_EDIT_TOOLS: &[&str] = &["Edit", "Write"];

pub const ISSUES_HEADER: &str = "⚠️ Code quality issues detected:\n\n";
pub const WARNINGS_MESSAGE: &str = "Format check completed with warnings.";

pub async fn evaluate_format(
    event: &HookEvent,
    config: &Config,
    ctx: &InvocationContext,
    runner: Arc<dyn ProcessRunner>,
) -> Result<Decision> {
    let tool_use = event.as_post_tool_use()?;
    if !FILE_EDIT_TOOLS.contains(&tool_use.tool_name.as_str()) {
        return Ok(Decision::pass());
    }
    let format = match config.format.as_ref().filter(|f| f.enabled) {
        Some(format) => format,
        None => return Ok(Decision::pass()),
    };
    let file = match tool_use.tool_input.file_path() {
        Some(file) if !file.is_empty() => file,
        _ => {
            debug!(tool = %tool_use.tool_name, "edit without a file path");
            return Ok(Decision::pass());
        }
    };

    let report = ToolScanner::from_config(format, runner)
        .scan(file, &ctx.project_dir)
        .await;

    let incomplete = (!report.unavailable.is_empty())
        .then(|| format!("Format check incomplete: {}", report.unavailable.join("; ")));

    if !report.has_issues() {
        return Ok(incomplete.map_or_else(Decision::pass, Decision::pass_with));
    }

    let mut sections: Vec<String> = report.issues.iter().map(ToString::to_string).collect();
    sections.extend(incomplete);
    let message = format!("{}{}", ISSUES_HEADER, sections.join("\n\n"));

    if format.enforce() {
        Ok(Decision::block(message))
    } else {
        Ok(Decision::pass_with(WARNINGS_MESSAGE).with_additional_context(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HookError;
    use crate::process::{CommandOutput, MockProcessRunner};
    use serde_json::json;

    fn edit(tool: &str, file: &str) -> HookEvent {
        HookEvent::from_value(json!({
            "hookEventName": "PostToolUse",
            "toolName": tool,
            "toolInput": {"file_path": file},
            "toolResponse": {}
        }))
        .unwrap()
    }

    fn enabled(enforce: bool) -> Config {
        Config::from_value(json!({"format": {"enabled": true, "enforce": enforce}})).unwrap()
    }

    fn failing_runner() -> Arc<dyn ProcessRunner> {
        let mut runner = MockProcessRunner::new();
        runner.expect_run().returning(|cmd| {
            let stdout = if cmd.args[0] == "tsc" {
                "a.ts(1,7): error TS2322: Type 'number' is not assignable to type 'string'."
            } else {
                ""
            };
            Ok(CommandOutput {
                code: Some(1),
                stdout: stdout.to_string(),
                stderr: String::new(),
            })
        });
        Arc::new(runner)
    }

    fn ctx() -> InvocationContext {
        InvocationContext::new("/work/web")
    }

    #[tokio::test]
    async fn test_other_tools_pass_without_running() {
        let runner = Arc::new(MockProcessRunner::new());
        let decision = evaluate_format(&edit("Read", "a.ts"), &enabled(true), &ctx(), runner)
            .await
            .unwrap();
        assert_eq!(decision, Decision::pass());
    }

    #[tokio::test]
    async fn test_disabled_passes() {
        let runner = Arc::new(MockProcessRunner::new());
        let decision = evaluate_format(&edit("Edit", "a.ts"), &Config::default(), &ctx(), runner)
            .await
            .unwrap();
        assert_eq!(decision, Decision::pass());
    }

    #[tokio::test]
    async fn test_issues_warn_with_additional_context() {
        let decision = evaluate_format(&edit("Write", "a.ts"), &enabled(false), &ctx(), failing_runner())
            .await
            .unwrap();
        assert!(!decision.is_blocked());
        assert_eq!(decision.message(), Some(WARNINGS_MESSAGE));
        let context = decision.additional_context().unwrap();
        assert!(context.starts_with(ISSUES_HEADER));
        assert!(context.contains("Run: npx prettier --write \"a.ts\"\n\nTypeScript errors:\na.ts(1,7): error TS2322"));
    }

    #[tokio::test]
    async fn test_issues_block_when_enforced() {
        let decision = evaluate_format(&edit("Edit", "a.ts"), &enabled(true), &ctx(), failing_runner())
            .await
            .unwrap();
        assert!(decision.is_blocked());
        assert!(decision.message().unwrap().starts_with(ISSUES_HEADER));
        assert!(decision.additional_context().is_none());
    }

    #[tokio::test]
    async fn test_unavailable_tools_never_block() {
        let mut runner = MockProcessRunner::new();
        runner
            .expect_run()
            .returning(|_| Err(HookError::unavailable("npx: command not found")));
        let decision = evaluate_format(&edit("Edit", "a.ts"), &enabled(true), &ctx(), Arc::new(runner))
            .await
            .unwrap();
        assert!(!decision.is_blocked());
        assert!(decision.message().unwrap().starts_with("Format check incomplete"));
    }

    #[tokio::test]
    async fn test_issues_keep_incomplete_note() {
        let mut runner = MockProcessRunner::new();
        runner.expect_run().returning(|cmd| {
            if cmd.args[0] == "tsc" {
                Err(HookError::unavailable("tsc timed out"))
            } else {
                Ok(CommandOutput {
                    code: Some(1),
                    stdout: String::new(),
                    stderr: String::new(),
                })
            }
        });
        let decision = evaluate_format(&edit("Edit", "a.ts"), &enabled(true), &ctx(), Arc::new(runner))
            .await
            .unwrap();
        assert!(decision.is_blocked());
        let message = decision.message().unwrap();
        assert!(message.contains("Run: npx prettier --write \"a.ts\""));
        assert!(message.ends_with("\n\nFormat check incomplete: tsc: Signal unavailable: tsc timed out"));
    }
}
