//! Built-in guard predicates for shell commands

use regex::Regex;

use crate::error::{HookError, Result};

/// Tool name the built-in predicates apply to
pub const SHELL_TOOL: &str = "Bash";

pub const GIT_PUSH_WARNING: &str = "⚠️ Git Push: You are about to push changes to remote. Please review your commits before proceeding.";

pub const TMUX_REMINDER: &str = "💡 Tmux Reminder: Consider running this long-running command in tmux for better log accessibility.";

pub const DANGEROUS_RM_REASON: &str = "🚫 BLOCKED: Dangerous rm command detected. This could delete critical files. Please use a safer approach.";

/// Commands that typically run long enough to deserve a multiplexer
pub const LONG_RUNNING_COMMANDS: &[&str] = &[
    "npm install",
    "npm ci",
    "yarn install",
    "pnpm install",
    "bun install",
    "npm run build",
    "npm run test",
    "npm run dev",
    "npm start",
    "yarn build",
    "yarn test",
    "yarn dev",
    "pnpm build",
    "pnpm test",
    "bun run build",
    "bun run test",
    "docker build",
    "docker-compose up",
];

const DANGEROUS_RM_PATTERNS: &[&str] = &[
    // rm -rf / (filesystem root)
    r"rm\s+-rf\s+/(\W|$)",
    // rm -rf ~ (home)
    r"rm\s+-rf\s+~\s*$",
    // rm -rf * (everything here)
    r"rm\s+-rf\s+\*\s*$",
    r"sudo\s+rm\s+-rf",
    // rm -rf . or rm -rf ..
    r"rm\s+-rf\s+\.\.?\s*$",
];

/// Dangerous deletion detector
#[derive(Debug, Clone)]
pub struct DangerousDeletion {
    patterns: Vec<Regex>,
}

impl DangerousDeletion {
    pub fn new() -> Result<Self> {
        let patterns = DANGEROUS_RM_PATTERNS
            .iter()
            .map(|p| Regex::new(p).map_err(|e| HookError::invalid_pattern("built-in guard", *p, &e)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_dangerous(&self, command: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(command))
    }
}

pub fn is_git_push(command: &str) -> bool {
    command.contains("git push")
}

pub fn is_long_running(command: &str) -> bool {
    let command = command.to_lowercase();
    LONG_RUNNING_COMMANDS.iter().any(|c| command.contains(c))
}
