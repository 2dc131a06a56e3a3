//! Tool-invocation guard (PreToolUse)

use super::InvocationContext;
use crate::config::Config;
use crate::decision::Decision;
use crate::error::Result;
use crate::event::HookEvent;
use crate::guard::GuardEngine;

/// Run the guard rules against the pending tool call
///
/// Every rule is compiled before any is evaluated, so one malformed pattern
/// fails the whole invocation.
pub async fn evaluate_guard(
    event: &HookEvent,
    config: &Config,
    ctx: &InvocationContext,
) -> Result<Decision> {
    let tool_use = event.as_pre_tool_use()?;
    let guard = match config.guard.as_ref().filter(|g| g.enabled) {
        Some(guard) => guard,
        None => return Ok(Decision::pass()),
    };

    let engine = GuardEngine::compile(guard)?;
    Ok(engine.evaluate(&tool_use.tool_name, &tool_use.tool_input, ctx.in_multiplexer))
}
