//! External formatter and type-checker scanner

use std::path::Path;
use std::sync::Arc;
use tracing::warn;

use super::{has_extension, ScanIssue, ScanReport};
use crate::config::FormatConfig;
use crate::process::{CommandSpec, ProcessRunner, TOOL_TIMEOUT};

/// Marker identifying a type-checker error line
pub const TYPE_ERROR_MARKER: &str = "error TS";

/// Maximum number of type-checker error lines kept per file
pub const MAX_TYPE_ERROR_LINES: usize = 3;

/// Runs the formatter check and type-checker on single files
#[derive(Clone)]
pub struct ToolScanner {
    prettier: bool,
    tsc: bool,
    prettier_extensions: Vec<String>,
    tsc_extensions: Vec<String>,
    runner: Arc<dyn ProcessRunner>,
}

impl std::fmt::Debug for ToolScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolScanner")
            .field("prettier", &self.prettier)
            .field("tsc", &self.tsc)
            .field("prettier_extensions", &self.prettier_extensions)
            .field("tsc_extensions", &self.tsc_extensions)
            .finish()
    }
}

impl ToolScanner {
    pub fn from_config(config: &FormatConfig, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            prettier: config.prettier(),
            tsc: config.tsc(),
            prettier_extensions: config.prettier_extensions(),
            tsc_extensions: config.tsc_extensions(),
            runner,
        }
    }

    /// Check one file; `cwd` is where the tools run
    pub async fn scan(&self, file: &str, cwd: &Path) -> ScanReport {
        let mut report = ScanReport::default();

        if self.prettier && has_extension(file, &self.prettier_extensions) {
            let cmd = CommandSpec::new("npx")
                .args(["prettier", "--check", file])
                .current_dir(cwd)
                .timeout(TOOL_TIMEOUT);
            match self.runner.run(&cmd).await {
                Ok(output) if output.success() => {}
                Ok(_) => report.issues.push(ScanIssue::Formatting {
                    file: file.to_string(),
                }),
                Err(e) => {
                    warn!(error = %e, "formatter check unavailable");
                    report.unavailable.push(format!("prettier: {}", e));
                }
            }
        }

        if self.tsc && has_extension(file, &self.tsc_extensions) {
            let cmd = CommandSpec::new("npx")
                .args(["tsc", "--noEmit", file])
                .current_dir(cwd)
                .timeout(TOOL_TIMEOUT);
            match self.runner.run(&cmd).await {
                Ok(output) if output.success() => {}
                Ok(output) => report.issues.push(ScanIssue::TypeErrors {
                    file: file.to_string(),
                    lines: type_error_lines(&output.combined()),
                }),
                Err(e) => {
                    warn!(error = %e, "type check unavailable");
                    report.unavailable.push(format!("tsc: {}", e));
                }
            }
        }

        report
    }
}

/// First lines carrying the type-error marker, bounded to keep messages short
pub fn type_error_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| line.contains(TYPE_ERROR_MARKER))
        .take(MAX_TYPE_ERROR_LINES)
        .map(str::to_string)
        .collect()
}
