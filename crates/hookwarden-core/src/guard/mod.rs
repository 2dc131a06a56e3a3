//! Guard engine for tool invocations
//!
//! Evaluation order is fixed:
//!
//! 1. advisory built-ins (push confirmation, multiplexer reminder), each
//!    behind its own flag;
//! 2. the dangerous-deletion predicate, which has no switch and blocks on
//!    match before any custom rule is looked at;
//! 3. custom rules in declaration order. The first matching `block` rule
//!    ends evaluation; matching `warn` rules accumulate.
//!
//! A pass carries the accumulated warnings joined by a blank line.

pub mod builtin;
pub mod rule;

use tracing::debug;

use crate::config::{BuiltInGuards, GuardConfig, RuleAction};
use crate::decision::Decision;
use crate::error::Result;
use crate::event::ToolInput;

pub use builtin::DangerousDeletion;
pub use rule::CompiledRule;

/// Separator between accumulated warnings
pub const WARNING_SEPARATOR: &str = "\n\n";

/// Compiled guard configuration
#[derive(Debug, Clone)]
pub struct GuardEngine {
    built_in: BuiltInGuards,
    dangerous: DangerousDeletion,
    rules: Vec<CompiledRule>,
}

impl GuardEngine {
    /// Compile every rule up front so a malformed pattern fails before any
    /// rule is evaluated
    pub fn compile(config: &GuardConfig) -> Result<Self> {
        let rules = config
            .rules()
            .iter()
            .map(CompiledRule::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            built_in: config.built_in(),
            dangerous: DangerousDeletion::new()?,
            rules,
        })
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Evaluate one tool invocation
    ///
    /// `in_multiplexer` tells whether the agent already runs inside a
    /// terminal multiplexer, which silences the long-running reminder.
    pub fn evaluate(&self, tool_name: &str, input: &ToolInput, in_multiplexer: bool) -> Decision {
        let mut warnings: Vec<String> = Vec::new();

        if tool_name == builtin::SHELL_TOOL {
            let command = input.command();

            if self.built_in.git_push_confirm() && builtin::is_git_push(command) {
                warnings.push(builtin::GIT_PUSH_WARNING.to_string());
            }

            if self.built_in.tmux_reminder() && !in_multiplexer && builtin::is_long_running(command)
            {
                warnings.push(builtin::TMUX_REMINDER.to_string());
            }

            if self.dangerous.is_dangerous(command) {
                debug!(command, "dangerous deletion blocked");
                return Decision::block(builtin::DANGEROUS_RM_REASON);
            }
        }

        for rule in &self.rules {
            if !rule.matches(tool_name, input) {
                continue;
            }
            match rule.action {
                RuleAction::Block => {
                    debug!(rule = %rule.name, tool_name, "guard rule blocked");
                    return Decision::block(rule.message.clone());
                }
                RuleAction::Warn => {
                    debug!(rule = %rule.name, tool_name, "guard rule warned");
                    warnings.push(rule.message.clone());
                }
            }
        }

        if warnings.is_empty() {
            Decision::pass()
        } else {
            Decision::pass_with(warnings.join(WARNING_SEPARATOR))
        }
    }
}
