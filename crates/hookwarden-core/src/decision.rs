//! Decision protocol shared by every evaluator
//!
//! A [`Decision`] is either a pass (optionally carrying an advisory message)
//! or a block (always carrying a reason). On the wire the block marker is
//! present only when blocking, so the consumer can decode it as a strict
//! boolean.

use serde::{Deserialize, Serialize};

use crate::error::{HookError, Result};
use crate::event::HookEventName;

/// Sentinel value of the `decision` field for a blocking verdict
pub const BLOCK_DECISION: &str = "block";

/// Fallback reason used when a block is requested with an empty message
const DEFAULT_BLOCK_REASON: &str = "Blocked by hook policy";

/// Verdict rendered by an evaluator
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Decision {
    blocked: bool,
    message: Option<String>,
    additional_context: Option<String>,
}

impl Decision {
    /// A silent pass
    pub fn pass() -> Self {
        Self::default()
    }

    /// A pass carrying an advisory note
    pub fn pass_with(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            blocked: false,
            message: (!message.is_empty()).then_some(message),
            additional_context: None,
        }
    }

    /// A block with the given reason
    ///
    /// A blank reason is replaced so a blocking decision never goes out
    /// without one.
    pub fn block(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        let reason = if reason.trim().is_empty() {
            DEFAULT_BLOCK_REASON.to_string()
        } else {
            reason
        };
        Self {
            blocked: true,
            message: Some(reason),
            additional_context: None,
        }
    }

    /// Attach side-channel context shown to the agent regardless of verdict
    pub fn with_additional_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        self.additional_context = (!context.is_empty()).then_some(context);
        self
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn additional_context(&self) -> Option<&str> {
        self.additional_context.as_deref()
    }

    /// Encode into the payload expected by the host for `event`
    pub fn to_output(&self, event: HookEventName) -> HookOutput {
        HookOutput {
            decision: self.blocked.then(|| BLOCK_DECISION.to_string()),
            reason: self.message.clone(),
            hook_specific_output: self.additional_context.as_ref().map(|context| {
                HookSpecificOutput {
                    hook_event_name: event,
                    additional_context: context.clone(),
                }
            }),
        }
    }

    /// Encode to a single-line JSON string
    pub fn to_json(&self, event: HookEventName) -> Result<String> {
        Ok(serde_json::to_string(&self.to_output(event))?)
    }
}

/// Wire form of a [`Decision`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_specific_output: Option<HookSpecificOutput>,
}

/// Event-specific side channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookSpecificOutput {
    pub hook_event_name: HookEventName,
    pub additional_context: String,
}

impl HookOutput {
    /// Decode back into a [`Decision`]
    ///
    /// The `decision` field must either be absent or hold the block
    /// sentinel; any other value is rejected.
    pub fn into_decision(self) -> Result<Decision> {
        let blocked = match self.decision.as_deref() {
            None => false,
            Some(BLOCK_DECISION) => true,
            Some(other) => {
                return Err(HookError::event(format!(
                    "unexpected decision value '{}'",
                    other
                )))
            }
        };
        if blocked && self.reason.as_deref().map_or(true, str::is_empty) {
            return Err(HookError::event("blocking decision without a reason"));
        }
        Ok(Decision {
            blocked,
            message: self.reason,
            additional_context: self.hook_specific_output.map(|o| o.additional_context),
        })
    }
}
