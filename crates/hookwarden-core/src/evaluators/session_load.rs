//! Session restore evaluator (SessionStart)

use super::InvocationContext;
use crate::config::Config;
use crate::decision::Decision;
use crate::error::Result;
use crate::event::HookEvent;
use crate::session::SessionStore;

pub const NO_SESSION_MESSAGE: &str = "No previous session found";

/// Surface the latest saved session of this project to the agent
pub async fn evaluate_session_load(
    event: &HookEvent,
    config: &Config,
    ctx: &InvocationContext,
) -> Result<Decision> {
    event.as_session_start()?;
    let memory = match config.session_memory.as_ref().filter(|m| m.enabled) {
        Some(memory) => memory,
        None => return Ok(Decision::pass()),
    };

    let session = match SessionStore::new(memory.storage_dir()).latest(&ctx.project_name) {
        Some(session) => session,
        None => return Ok(Decision::pass_with(NO_SESSION_MESSAGE)),
    };

    let decision = Decision::pass_with(format!("📂 Restored session from {}", session.timestamp));
    let lines = session.summary_lines();
    if lines.is_empty() {
        return Ok(decision);
    }
    Ok(decision.with_additional_context(format!(
        "📂 Previous Session Context:\n{}",
        lines.join("\n")
    )))
}
