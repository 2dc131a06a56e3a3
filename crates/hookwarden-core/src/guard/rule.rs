//! Compiled user policy rules

use regex::{Regex, RegexBuilder};

use crate::config::{PolicyRule, RuleAction};
use crate::error::{HookError, Result};
use crate::event::ToolInput;

/// A [`PolicyRule`] with its patterns compiled case-insensitively
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub name: String,
    pub action: RuleAction,
    pub message: String,
    tool_pattern: Regex,
    input_pattern: Option<Regex>,
}

impl CompiledRule {
    /// Compile a rule; a malformed pattern is a configuration error
    pub fn compile(rule: &PolicyRule) -> Result<Self> {
        let source = format!("guard rule '{}'", rule.name);
        let tool_pattern = compile_insensitive(&source, &rule.tool_pattern)?;
        let input_pattern = rule
            .input_pattern
            .as_deref()
            .map(|pattern| compile_insensitive(&source, pattern))
            .transpose()?;
        Ok(Self {
            name: rule.name.clone(),
            action: rule.action,
            message: rule.message.clone(),
            tool_pattern,
            input_pattern,
        })
    }

    /// Tool pattern matches the tool name, and the input pattern (if any)
    /// matches the serialized input
    pub fn matches(&self, tool_name: &str, input: &ToolInput) -> bool {
        if !self.tool_pattern.is_match(tool_name) {
            return false;
        }
        match &self.input_pattern {
            Some(pattern) => pattern.is_match(&input.serialized()),
            None => true,
        }
    }
}

fn compile_insensitive(source: &str, pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| HookError::invalid_pattern(source, pattern, &e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule(tool: &str, input: Option<&str>) -> PolicyRule {
        PolicyRule {
            name: "test".into(),
            tool_pattern: tool.into(),
            input_pattern: input.map(Into::into),
            action: RuleAction::Warn,
            message: "msg".into(),
        }
    }

    #[test]
    fn test_tool_pattern_case_insensitive() {
        let compiled = CompiledRule::compile(&rule("bash", None)).unwrap();
        assert!(compiled.matches("Bash", &ToolInput::default()));
        assert!(!compiled.matches("Edit", &ToolInput::default()));
    }

    #[test]
    fn test_input_pattern_over_serialized_input() {
        let compiled = CompiledRule::compile(&rule("^bash$", Some("NPM\\s+publish"))).unwrap();
        let input = ToolInput::from(json!({"command": "npm publish --access public"}));
        assert!(compiled.matches("Bash", &input));
        let other = ToolInput::from(json!({"command": "npm test"}));
        assert!(!compiled.matches("Bash", &other));
    }

    #[test]
    fn test_input_pattern_sees_keys() {
        let compiled = CompiledRule::compile(&rule("write", Some("\"filePath\":\".*\\.env\""))).unwrap();
        let input = ToolInput::from(json!({"filePath": "config/.env", "content": "x"}));
        assert!(compiled.matches("Write", &input));
    }

    #[test]
    fn test_malformed_pattern_is_match_error() {
        let err = CompiledRule::compile(&rule("bash", Some("(unclosed"))).unwrap_err();
        match err {
            HookError::Match { pattern, .. } => assert_eq!(pattern, "(unclosed"),
            other => panic!("unexpected error {:?}", other),
        }
    }
}
