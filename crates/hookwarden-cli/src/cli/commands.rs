//! CLI command definitions
//!
//! One subcommand per hook. The event payload is always read from stdin.

use clap::{Parser, Subcommand};
use hookwarden_core::config::loader::PROJECT_DIR_ENV;
use std::path::PathBuf;

/// Hookwarden CLI
///
/// Evaluate one agent lifecycle event read from stdin and print the
/// resulting decision as a single JSON line.
#[derive(Parser, Debug)]
#[command(name = "hookwarden")]
#[command(about = "Hookwarden - Policy hooks for coding agents", long_about = None)]
#[command(version)]
pub struct HookwardenCli {
    /// Output verbosity level (-v, -vv, -vvv); logs go to stderr
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Project root holding the configuration files
    ///
    /// Defaults to the working directory.
    #[arg(long, global = true, env = PROJECT_DIR_ENV)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: HookCommand,
}

/// Available hooks
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum HookCommand {
    /// Gate the end of a turn on the size of uncommitted work (Stop)
    Commit,

    /// Check a pending tool call against guard rules (PreToolUse)
    Guard,

    /// Run the formatter and type-checker on an edited file (PostToolUse)
    Format,

    /// Save a summary of the session and evict old ones (Stop)
    SessionSave {
        /// Notes stored with the session when custom context is included
        #[arg(long)]
        notes: Option<String>,
    },

    /// Restore the latest saved session of this project (SessionStart)
    SessionLoad,

    /// Extract reusable patterns from the session transcript (Stop)
    Learn,
}

impl HookCommand {
    pub fn name(&self) -> &'static str {
        match self {
            HookCommand::Commit => "commit",
            HookCommand::Guard => "guard",
            HookCommand::Format => "format",
            HookCommand::SessionSave { .. } => "session-save",
            HookCommand::SessionLoad => "session-load",
            HookCommand::Learn => "learn",
        }
    }
}
