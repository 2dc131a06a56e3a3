//! Keyword-driven pattern extraction from session transcripts
//!
//! Each category has its own detector and its own cap. Detected patterns are
//! written as small markdown notes with front matter, one file per pattern.

use chrono::NaiveDate;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

use crate::config::LearningCategory;
use crate::error::Result;
use crate::event::TranscriptMessage;

const ASSISTANT_ROLE: &str = "assistant";

/// Maximum characters of a pattern body
pub const MAX_CONTENT_CHARS: usize = 500;
/// Maximum characters of a pattern context
pub const MAX_CONTEXT_CHARS: usize = 200;
/// Maximum characters of the error text used in a title
pub const MAX_TITLE_CHARS: usize = 50;
/// Debugging notes must be longer than this
pub const MIN_DEBUGGING_CHARS: usize = 200;

const ERROR_INDICATORS: &[&str] = &[
    "error:",
    "Error:",
    "ERROR",
    "failed",
    "Failed",
    "exception",
    "Exception",
];
const RESOLUTION_WORDS: &[&str] = &["fix", "solution", "resolve"];
const WORKAROUND_KEYWORDS: &[&str] = &["workaround", "instead of", "alternative", "hack", "trick"];
const DEBUGGING_KEYWORDS: &[&str] = &[
    "debug",
    "investigate",
    "root cause",
    "the issue is",
    "found the problem",
];
const CONVENTION_KEYWORDS: &[&str] = &[
    "convention",
    "best practice",
    "pattern",
    "standard",
    "should always",
    "never use",
];

/// A pattern worth remembering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnedPattern {
    pub category: LearningCategory,
    pub title: String,
    pub content: String,
    pub context: String,
}

impl LearnedPattern {
    fn from_message(category: LearningCategory, title: &str, message: &TranscriptMessage) -> Self {
        Self {
            category,
            title: title.to_string(),
            content: truncate(&message.content, MAX_CONTENT_CHARS),
            context: String::new(),
        }
    }

    /// Markdown note with front matter
    pub fn to_markdown(&self, date: NaiveDate) -> String {
        let context = if self.context.is_empty() {
            "N/A"
        } else {
            self.context.as_str()
        };
        format!(
            "---\ncategory: {}\ndate: {}\n---\n\n# {}\n\n## Context\n\n{}\n\n## Solution\n\n{}\n",
            self.category.as_str(),
            date.format("%Y-%m-%d"),
            self.title,
            context,
            self.content
        )
    }
}

/// Run the detectors of the enabled categories, in a fixed category order
pub fn extract_patterns(
    transcript: &[TranscriptMessage],
    categories: &[LearningCategory],
) -> Vec<LearnedPattern> {
    let mut patterns = Vec::new();
    for category in LearningCategory::ALL {
        if !categories.contains(&category) {
            continue;
        }
        let found = match category {
            LearningCategory::ErrorResolution => error_resolutions(transcript),
            LearningCategory::FrameworkWorkaround => keyword_patterns(
                transcript,
                category,
                "Workaround Pattern",
                WORKAROUND_KEYWORDS,
                0,
            ),
            LearningCategory::Debugging => keyword_patterns(
                transcript,
                category,
                "Debugging Approach",
                DEBUGGING_KEYWORDS,
                MIN_DEBUGGING_CHARS,
            ),
            LearningCategory::Convention => keyword_patterns(
                transcript,
                category,
                "Convention/Best Practice",
                CONVENTION_KEYWORDS,
                0,
            ),
        };
        debug!(category = category.as_str(), count = found.len(), "patterns detected");
        patterns.extend(found);
    }
    patterns
}

/// Per-category cap on detected patterns
pub fn category_limit(category: LearningCategory) -> usize {
    match category {
        LearningCategory::ErrorResolution => 3,
        _ => 2,
    }
}

/// An error-bearing message directly answered by an assistant fix
fn error_resolutions(transcript: &[TranscriptMessage]) -> Vec<LearnedPattern> {
    transcript
        .windows(2)
        .filter_map(|pair| {
            let (message, reply) = (&pair[0], &pair[1]);
            let has_error = ERROR_INDICATORS
                .iter()
                .any(|indicator| message.content.contains(indicator));
            let has_resolution = reply.role == ASSISTANT_ROLE
                && RESOLUTION_WORDS
                    .iter()
                    .any(|word| reply.content.contains(word));
            if !(has_error && has_resolution) {
                return None;
            }
            let error_type = error_title(&message.content)
                .map(|text| truncate(text, MAX_TITLE_CHARS))
                .filter(|text| !text.is_empty())
                .unwrap_or_else(|| "Unknown Error".to_string());
            Some(LearnedPattern {
                category: LearningCategory::ErrorResolution,
                title: format!("Fix: {}", error_type),
                content: truncate(&reply.content, MAX_CONTENT_CHARS),
                context: truncate(&message.content, MAX_CONTEXT_CHARS),
            })
        })
        .take(category_limit(LearningCategory::ErrorResolution))
        .collect()
}

/// Assistant messages containing any keyword (case-insensitive)
fn keyword_patterns(
    transcript: &[TranscriptMessage],
    category: LearningCategory,
    title: &str,
    keywords: &[&str],
    min_chars: usize,
) -> Vec<LearnedPattern> {
    transcript
        .iter()
        .filter(|message| message.role == ASSISTANT_ROLE && !message.content.is_empty())
        .filter(|message| {
            let lowered = message.content.to_lowercase();
            keywords.iter().any(|keyword| lowered.contains(keyword))
        })
        .filter(|message| message.content.chars().count() > min_chars)
        .map(|message| LearnedPattern::from_message(category, title, message))
        .take(category_limit(category))
        .collect()
}

/// Text after the first `error:`-like marker, up to the end of its line
fn error_title(content: &str) -> Option<&str> {
    static ERROR_TITLE: OnceLock<Option<Regex>> = OnceLock::new();
    ERROR_TITLE
        .get_or_init(|| Regex::new(r"(?:error|Error|ERROR)[:\s]+([^\n]+)").ok())
        .as_ref()?
        .captures(content)?
        .get(1)
        .map(|m| m.as_str())
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Write each pattern as `{date}-{category}-{counter}.md` in `dir`
///
/// The counter starts after the number of entries already in `dir`.
/// Returns the written file names in order.
pub fn save_patterns(patterns: &[LearnedPattern], dir: &Path, date: NaiveDate) -> Result<Vec<String>> {
    std::fs::create_dir_all(dir)?;
    let existing = std::fs::read_dir(dir)?.count();
    let stamp = date.format("%Y-%m-%d").to_string();

    let mut saved = Vec::with_capacity(patterns.len());
    for (offset, pattern) in patterns.iter().enumerate() {
        let file_name = format!(
            "{}-{}-{}.md",
            stamp,
            pattern.category.as_str(),
            existing + offset + 1
        );
        std::fs::write(dir.join(&file_name), pattern.to_markdown(date))?;
        saved.push(file_name);
    }
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(role: &str, content: &str) -> TranscriptMessage {
        TranscriptMessage {
            role: role.to_string(),
            content: content.to_string(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_error_resolution_detected() {
        let transcript = vec![
            msg("user", "build output:\nError: cannot find module 'lodash'\nat line 3"),
            msg("assistant", "The fix is to add lodash to dependencies."),
        ];
        let patterns = extract_patterns(&transcript, &LearningCategory::ALL);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].category, LearningCategory::ErrorResolution);
        assert_eq!(patterns[0].title, "Fix: cannot find module 'lodash'");
        assert!(patterns[0].context.starts_with("build output:"));
    }

    #[test]
    fn test_error_without_assistant_fix_ignored() {
        let transcript = vec![
            msg("user", "tests failed"),
            msg("user", "please fix"),
            msg("assistant", "Looking into it."),
        ];
        assert!(error_resolutions(&transcript).is_empty());
    }

    #[test]
    fn test_unknown_error_title() {
        let transcript = vec![msg("user", "the job failed"), msg("assistant", "a fix")];
        assert_eq!(error_resolutions(&transcript)[0].title, "Fix: Unknown Error");
    }

    #[test]
    fn test_category_caps() {
        let transcript: Vec<_> = (0..5)
            .map(|_| msg("assistant", "Use this workaround instead of the default."))
            .collect();
        let patterns = extract_patterns(&transcript, &[LearningCategory::FrameworkWorkaround]);
        assert_eq!(patterns.len(), 2);
    }

    #[test]
    fn test_debugging_needs_long_message() {
        let short = msg("assistant", "The root cause is a stale cache.");
        let long = msg("assistant", &format!("The root cause is a stale cache. {}", "x".repeat(200)));
        let patterns = extract_patterns(&[short, long], &[LearningCategory::Debugging]);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].title, "Debugging Approach");
    }

    #[test]
    fn test_disabled_categories_skipped() {
        let transcript = vec![msg("assistant", "By convention you should always pin versions.")];
        assert!(extract_patterns(&transcript, &[LearningCategory::Debugging]).is_empty());
        assert_eq!(
            extract_patterns(&transcript, &[LearningCategory::Convention]).len(),
            1
        );
    }

    #[test]
    fn test_content_truncated() {
        let transcript = vec![msg("assistant", &format!("hack {}", "é".repeat(600)))];
        let patterns = extract_patterns(&transcript, &[LearningCategory::FrameworkWorkaround]);
        assert_eq!(patterns[0].content.chars().count(), MAX_CONTENT_CHARS);
    }

    #[test]
    fn test_markdown_layout() {
        let pattern = LearnedPattern {
            category: LearningCategory::Convention,
            title: "Convention/Best Practice".into(),
            content: "Always pin versions.".into(),
            context: String::new(),
        };
        assert_eq!(
            pattern.to_markdown(date()),
            "---\ncategory: convention\ndate: 2026-10-19\n---\n\n# Convention/Best Practice\n\n## Context\n\nN/A\n\n## Solution\n\nAlways pin versions.\n"
        );
    }

    #[test]
    fn test_save_counts_existing_files() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("old.md"), "x").unwrap();
        let pattern = LearnedPattern {
            category: LearningCategory::Debugging,
            title: "Debugging Approach".into(),
            content: "c".into(),
            context: String::new(),
        };
        let saved = save_patterns(&[pattern.clone(), pattern], dir.path(), date()).unwrap();
        assert_eq!(
            saved,
            vec!["2026-10-19-debugging-2.md", "2026-10-19-debugging-3.md"]
        );
        assert!(dir.path().join("2026-10-19-debugging-3.md").exists());
    }
}
