//! Hook event payloads
//!
//! The host sends one JSON object per invocation. Keys may arrive in
//! snake_case or camelCase; [`HookEvent::from_json`] normalizes them
//! recursively to camelCase before decoding.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{HookError, Result};

/// Lifecycle points a hook can be attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HookEventName {
    Stop,
    PreToolUse,
    PostToolUse,
    SessionStart,
}

impl fmt::Display for HookEventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookEventName::Stop => write!(f, "Stop"),
            HookEventName::PreToolUse => write!(f, "PreToolUse"),
            HookEventName::PostToolUse => write!(f, "PostToolUse"),
            HookEventName::SessionStart => write!(f, "SessionStart"),
        }
    }
}

/// One hook invocation payload
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "hookEventName")]
pub enum HookEvent {
    Stop(StopEvent),
    PreToolUse(ToolUseEvent),
    PostToolUse(PostToolUseEvent),
    SessionStart(SessionStartEvent),
}

/// Emitted when the agent is about to finish its turn
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopEvent {
    /// True when the agent is already continuing because of a stop hook
    #[serde(default)]
    pub stop_hook_active: bool,
    /// Conversation messages, when the host supplies them. A transcript
    /// of any other shape decodes as empty; non-object entries are skipped.
    #[serde(default, deserialize_with = "lenient_transcript")]
    pub transcript: Vec<TranscriptMessage>,
}

/// One message of a session transcript
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptMessage {
    #[serde(default, deserialize_with = "message_text")]
    pub role: String,
    /// Plain text; content blocks are flattened to their `text` parts
    #[serde(default, deserialize_with = "message_text")]
    pub content: String,
}

fn lenient_transcript<'de, D>(deserializer: D) -> std::result::Result<Vec<TranscriptMessage>, D::Error>
where
    D: Deserializer<'de>,
{
    let messages = match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    };
    Ok(messages)
}

fn message_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(text_of(&Value::deserialize(deserializer)?))
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Array(blocks) => blocks
            .iter()
            .filter_map(|block| match block {
                Value::String(text) => Some(text.as_str()),
                Value::Object(fields) => fields.get("text").and_then(Value::as_str),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

/// Emitted before a tool runs
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolUseEvent {
    pub tool_name: String,
    #[serde(default)]
    pub tool_input: ToolInput,
}

/// Emitted after a tool ran
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostToolUseEvent {
    pub tool_name: String,
    #[serde(default)]
    pub tool_input: ToolInput,
    #[serde(default)]
    pub tool_response: Map<String, Value>,
}

/// Emitted when a session begins
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SessionStartEvent {}

/// Open, schema-less tool input
///
/// Only two keys are relied upon: `command` for shell-like tools and
/// `filePath` for file editing tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolInput(Map<String, Value>);

impl ToolInput {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value of `key`, if present and a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// The shell command, or an empty string
    pub fn command(&self) -> &str {
        self.get_str("command").unwrap_or_default()
    }

    pub fn file_path(&self) -> Option<&str> {
        self.get_str("filePath")
    }

    /// Compact JSON form used for input-pattern matching
    pub fn serialized(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }
}

impl From<Value> for ToolInput {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }
}

impl HookEvent {
    /// Parse a raw payload, normalizing keys to camelCase first
    pub fn from_json(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| HookError::event(format!("Unable to parse input as JSON: {}", e)))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(normalize_keys(value))
            .map_err(|e| HookError::event(format!("Unrecognized hook payload: {}", e)))
    }

    pub fn name(&self) -> HookEventName {
        match self {
            HookEvent::Stop(_) => HookEventName::Stop,
            HookEvent::PreToolUse(_) => HookEventName::PreToolUse,
            HookEvent::PostToolUse(_) => HookEventName::PostToolUse,
            HookEvent::SessionStart(_) => HookEventName::SessionStart,
        }
    }

    pub fn as_stop(&self) -> Result<&StopEvent> {
        match self {
            HookEvent::Stop(event) => Ok(event),
            other => Err(other.unexpected(HookEventName::Stop)),
        }
    }

    pub fn as_pre_tool_use(&self) -> Result<&ToolUseEvent> {
        match self {
            HookEvent::PreToolUse(event) => Ok(event),
            other => Err(other.unexpected(HookEventName::PreToolUse)),
        }
    }

    pub fn as_post_tool_use(&self) -> Result<&PostToolUseEvent> {
        match self {
            HookEvent::PostToolUse(event) => Ok(event),
            other => Err(other.unexpected(HookEventName::PostToolUse)),
        }
    }

    pub fn as_session_start(&self) -> Result<&SessionStartEvent> {
        match self {
            HookEvent::SessionStart(event) => Ok(event),
            other => Err(other.unexpected(HookEventName::SessionStart)),
        }
    }

    fn unexpected(&self, expected: HookEventName) -> HookError {
        HookError::event(format!("expected a {} event, got {}", expected, self.name()))
    }
}

/// Recursively rewrite every object key from snake_case to camelCase
pub fn normalize_keys(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_keys).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (snake_to_camel(&key), normalize_keys(value)))
                .collect(),
        ),
        other => other,
    }
}

/// `tool_name` -> `toolName`; only an underscore followed by a lowercase
/// ASCII letter is folded, anything else is kept as is.
fn snake_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '_' {
            if let Some(next) = chars.peek().copied().filter(char::is_ascii_lowercase) {
                out.push(next.to_ascii_uppercase());
                chars.next();
                continue;
            }
        }
        out.push(c);
    }
    out
}
