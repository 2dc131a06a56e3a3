//! Continuous-learning evaluator (Stop)

use tracing::info;

use super::InvocationContext;
use crate::config::Config;
use crate::decision::Decision;
use crate::error::Result;
use crate::event::HookEvent;
use crate::learning::{extract_patterns, save_patterns};

pub const NOTHING_LEARNED_MESSAGE: &str = "No learnable patterns detected in this session";

/// Extract reusable patterns from the transcript and store them as notes
///
/// Never blocks. Failing to write a note is an I/O error.
pub async fn evaluate_learn(
    event: &HookEvent,
    config: &Config,
    ctx: &InvocationContext,
) -> Result<Decision> {
    let stop = event.as_stop()?;
    let learning = match config.learning.as_ref().filter(|l| l.enabled) {
        Some(learning) => learning,
        None => return Ok(Decision::pass()),
    };
    if stop.stop_hook_active {
        return Ok(Decision::pass());
    }

    let length = stop.transcript.len();
    let min_length = learning.min_session_length();
    if length < min_length {
        return Ok(Decision::pass_with(format!(
            "Session too short for learning extraction ({}/{} messages)",
            length, min_length
        )));
    }

    let patterns = extract_patterns(&stop.transcript, &learning.categories());
    if patterns.is_empty() {
        return Ok(Decision::pass_with(NOTHING_LEARNED_MESSAGE));
    }

    let output_dir = learning.output_dir();
    let saved = save_patterns(&patterns, &output_dir, ctx.now.date_naive())?;
    info!(count = saved.len(), dir = %output_dir.display(), "patterns learned");

    let listing = saved
        .iter()
        .map(|file| format!("  • {}", file))
        .collect::<Vec<_>>()
        .join("\n");
    Ok(Decision::pass_with(format!(
        "📚 Learned {} pattern(s) from this session:\n{}",
        patterns.len(),
        listing
    )))
}
