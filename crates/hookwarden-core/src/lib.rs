//! Hookwarden Core
//!
//! Decision-evaluation core for coding-agent lifecycle hooks. Each hook
//! invocation consumes one [`HookEvent`] plus the merged [`Config`] and
//! produces exactly one [`Decision`]: a pass (optionally with an advisory
//! note) or a block with a mandatory reason.
//!
//! ## Hooks
//!
//! - **commit** (`Stop`): blocks when uncommitted work exceeds file or line
//!   thresholds, and reports debug statements left in modified files
//! - **guard** (`PreToolUse`): built-in safety checks and user regex rules
//!   over the pending tool call
//! - **format** (`PostToolUse`): formatter and type-checker on edited files
//! - **session-save** / **session-load** (`Stop` / `SessionStart`): persist
//!   and restore a short session summary, with age and count eviction
//! - **learn** (`Stop`): extract reusable patterns from the transcript
//!
//! ## Failure model
//!
//! Advisory signals (git, formatter, type-checker) degrade to a pass with a
//! note when unavailable. Primary obligations (parsing the event and the
//! configuration, compiling user patterns, writing a new artifact) fail the
//! invocation with a [`HookError`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use hookwarden_core::{evaluators, Config, HookEvent, InvocationContext};
//!
//! # async fn run() -> hookwarden_core::Result<()> {
//! let event = HookEvent::from_json(
//!     r#"{"hook_event_name":"PreToolUse","tool_name":"Bash","tool_input":{"command":"rm -rf /"}}"#,
//! )?;
//! let config = Config::from_value(serde_json::json!({"guard": {"enabled": true}}))?;
//! let ctx = InvocationContext::new("/work/api");
//!
//! let decision = evaluators::evaluate_guard(&event, &config, &ctx).await?;
//! assert!(decision.is_blocked());
//! println!("{}", decision.to_json(event.name())?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod decision;
pub mod error;
pub mod evaluators;
pub mod event;
pub mod git;
pub mod guard;
pub mod learning;
pub mod process;
pub mod scanner;
pub mod session;
pub mod threshold;

pub use config::{Config, ConfigLoader};
pub use decision::{Decision, HookOutput};
pub use error::{HookError, Result};
pub use evaluators::InvocationContext;
pub use event::{HookEvent, HookEventName, ToolInput};
pub use git::{ChangeSource, GitWorkspace};
pub use guard::GuardEngine;
pub use process::{ProcessRunner, TokioProcessRunner};
pub use session::{RetentionPolicy, SessionStore};
pub use threshold::{ChangeMetrics, Thresholds};
