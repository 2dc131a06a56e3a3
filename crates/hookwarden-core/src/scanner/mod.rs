//! Code-quality scanners
//!
//! The line scanner looks for debug statements in modified files; the tool
//! scanner runs a formatter check and a type-checker on an edited file.
//! Both feed a [`ScanReport`]. Whether issues block is decided by the
//! evaluator from its `enforce` flag, never by the scanners.

pub mod lines;
pub mod tools;

use std::fmt;

pub use lines::{DebugMatch, LineScanner};
pub use tools::ToolScanner;

/// One detected code-quality problem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanIssue {
    /// A line matching a debug-statement pattern
    DebugStatement(DebugMatch),
    /// The formatter reported the file as unformatted
    Formatting { file: String },
    /// The type-checker failed; at most three error lines are kept
    TypeErrors { file: String, lines: Vec<String> },
}

impl fmt::Display for ScanIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanIssue::DebugStatement(m) => write!(f, "{}:{} - {}", m.file, m.line, m.pattern),
            ScanIssue::Formatting { file } => write!(
                f,
                "Prettier: File needs formatting. Run: npx prettier --write \"{}\"",
                file
            ),
            ScanIssue::TypeErrors { file, lines } if lines.is_empty() => {
                write!(f, "TypeScript check failed for {}", file)
            }
            ScanIssue::TypeErrors { lines, .. } => {
                write!(f, "TypeScript errors:\n{}", lines.join("\n"))
            }
        }
    }
}

/// Merged scanner output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub issues: Vec<ScanIssue>,
    /// Signals that could not be measured
    pub unavailable: Vec<String>,
}

impl ScanReport {
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn merge(mut self, other: ScanReport) -> Self {
        self.issues.extend(other.issues);
        self.unavailable.extend(other.unavailable);
        self
    }

    /// Debug-statement matches in the report
    pub fn debug_matches(&self) -> impl Iterator<Item = &DebugMatch> {
        self.issues.iter().filter_map(|issue| match issue {
            ScanIssue::DebugStatement(m) => Some(m),
            _ => None,
        })
    }
}

/// Whether `path` ends in one of the accepted extensions (without dot)
pub fn has_extension(path: &str, extensions: &[String]) -> bool {
    match path.rsplit_once('.') {
        Some((_, ext)) if !ext.contains('/') => {
            extensions.iter().any(|accepted| accepted.eq_ignore_ascii_case(ext))
        }
        _ => false,
    }
}
