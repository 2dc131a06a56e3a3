//! Hookwarden CLI
//!
//! Runs one lifecycle hook of a coding agent. The hook event is read from
//! stdin and exactly one decision is printed on stdout as a JSON line.
//!
//! # Usage
//!
//! ```bash
//! # Guard a pending tool call
//! echo '{"hook_event_name":"PreToolUse","tool_name":"Bash","tool_input":{"command":"git push"}}' \
//!     | hookwarden guard
//!
//! # Gate the end of a turn on the size of uncommitted work
//! echo '{"hook_event_name":"Stop","stop_hook_active":false}' | hookwarden commit
//!
//! # Save the session with a note
//! echo '{"hook_event_name":"Stop"}' | hookwarden session-save --notes "auth refactor"
//! ```
//!
//! # Exit Codes
//!
//! - 0: A decision was printed (pass or block)
//! - 3: Invalid event, configuration or pattern
//! - 4: I/O failure on the event or a session artifact
//! - 10: Internal error

mod cli;

use anyhow::Context;
use clap::Parser;
use std::io::Read;
use tracing::Level;

use cli::{ExitCode, HookwardenCli};

fn main() {
    let cli = HookwardenCli::parse();

    // Logs go to stderr so stdout carries only the decision
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(verbosity_level(cli.verbose).into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match run(&cli) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from_error(&e)
        }
    };
    std::process::exit(exit_code.into());
}

fn run(cli: &HookwardenCli) -> anyhow::Result<String> {
    let mut raw_event = String::new();
    std::io::stdin()
        .read_to_string(&mut raw_event)
        .context("Failed to read hook event from stdin")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(cli::run(cli, &raw_event))
}

fn verbosity_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}
