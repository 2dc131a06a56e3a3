//! Commit-size evaluator (Stop)

use tracing::{debug, warn};

use super::InvocationContext;
use crate::config::{Config, DebugDetectionConfig};
use crate::decision::Decision;
use crate::error::Result;
use crate::event::HookEvent;
use crate::git::ChangeSource;
use crate::scanner::lines::{format_matches, LineScanner};
use crate::threshold::{Thresholds, DEFAULT_BLOCK_REASON};

pub const DISABLED_MESSAGE: &str = "Commit hook is disabled in configuration";
pub const GIT_UNAVAILABLE_MESSAGE: &str = "Git is not available in the current project";
pub const STOP_HOOK_ACTIVE_MESSAGE: &str = "Commit hook is skipped because stop hook is active";

/// Default debug warning; `{matches}` receives one line per match
pub const DEFAULT_DEBUG_WARNING: &str =
    "⚠️ Debug statements detected in modified files:\n{matches}\n\nPlease remove debug statements before committing.";

/// Block the stop when uncommitted work is too large, and report debug
/// statements left in modified files
///
/// Measurement failures pass with a note. A malformed debug pattern is a
/// configuration error.
pub async fn evaluate_commit(
    event: &HookEvent,
    config: &Config,
    ctx: &InvocationContext,
    changes: &dyn ChangeSource,
) -> Result<Decision> {
    let stop = event.as_stop()?;
    let commit = config.commit.clone().unwrap_or_default();

    if !commit.threshold.enabled {
        return Ok(Decision::pass_with(DISABLED_MESSAGE));
    }
    if !changes.is_available().await {
        return Ok(Decision::pass_with(GIT_UNAVAILABLE_MESSAGE));
    }
    if stop.stop_hook_active {
        return Ok(Decision::pass_with(STOP_HOOK_ACTIVE_MESSAGE));
    }

    let metrics = match changes.change_metrics().await {
        Ok(metrics) => metrics,
        Err(e) => {
            warn!(error = %e, "change metrics unavailable");
            return Ok(Decision::pass_with(format!(
                "Commit size check skipped: {}",
                e
            )));
        }
    };

    let thresholds = Thresholds::from(&commit.threshold);
    let verdict = thresholds.evaluate(&metrics);
    debug!(?metrics, ?verdict, "commit thresholds evaluated");

    let mut sections = Vec::new();
    if verdict.blocked {
        let template = commit
            .threshold
            .block_reason
            .as_deref()
            .unwrap_or(DEFAULT_BLOCK_REASON);
        sections.push(thresholds.render(template, &metrics));
    }

    let mut debug_blocked = false;
    if let Some(detection) = commit.debug_detection.as_ref().filter(|d| d.enabled) {
        if let Some(warning) = debug_warning(detection, ctx, changes).await? {
            debug_blocked = detection.enforce();
            sections.push(warning);
        }
    }

    let message = sections.join("\n\n");
    if verdict.blocked || debug_blocked {
        Ok(Decision::block(message))
    } else {
        Ok(Decision::pass_with(message))
    }
}

/// Rendered warning for debug statements in modified files, if any
async fn debug_warning(
    detection: &DebugDetectionConfig,
    ctx: &InvocationContext,
    changes: &dyn ChangeSource,
) -> Result<Option<String>> {
    let scanner = LineScanner::from_config(detection)?;
    let files = match changes.modified_files().await {
        Ok(files) => files,
        Err(e) => {
            warn!(error = %e, "modified files unavailable, skipping debug detection");
            return Ok(None);
        }
    };

    let report = scanner.scan_files(&ctx.project_dir, &files).await;
    if !report.has_issues() {
        return Ok(None);
    }
    let template = detection
        .warn_message
        .as_deref()
        .unwrap_or(DEFAULT_DEBUG_WARNING);
    Ok(Some(template.replace(
        "{matches}",
        &format_matches(report.debug_matches()),
    )))
}
