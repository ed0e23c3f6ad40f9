use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{DriftError, DriftResult};
use crate::exemptions::glob::Glob;

/// Rule value that exempts a whole block, header included.
pub const ENTIRE_BLOCK: &str = "*";

#[derive(Debug, Clone)]
pub enum ExemptionRule {
    EntireBlock,
    /// Lines of the block whose trimmed text matches any of these are dropped.
    Lines(Vec<Glob>),
}

/// Ordered header-pattern → rule mapping. The first matching header pattern wins.
#[derive(Debug, Clone, Default)]
pub struct ExemptionRuleSet {
    entries: Vec<(Glob, ExemptionRule)>,
}

impl ExemptionRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entire_block(mut self, header: &str) -> DriftResult<Self> {
        self.entries.push((compile(header)?, ExemptionRule::EntireBlock));
        Ok(self)
    }

    pub fn with_lines<S: AsRef<str>>(mut self, header: &str, lines: &[S]) -> DriftResult<Self> {
        let patterns = lines
            .iter()
            .map(|p| compile(p.as_ref()))
            .collect::<DriftResult<Vec<_>>>()?;
        self.entries.push((compile(header)?, ExemptionRule::Lines(patterns)));
        Ok(self)
    }

    /// Reads a rule file: a JSON object of header glob → `"*"` or array of line globs.
    pub fn load(path: &Path) -> DriftResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| DriftError::io(path.display().to_string(), e))?;
        Self::from_json_str(&content)
            .map_err(|e| DriftError::parse(format!("exemption file '{}': {}", path.display(), e)))
    }

    pub fn from_json_str(content: &str) -> DriftResult<Self> {
        let value: Value = serde_json::from_str(content).map_err(|e| DriftError::parse(e.to_string()))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> DriftResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| DriftError::parse("exemption rules must be a JSON object"))?;

        object.iter().try_fold(Self::new(), |rules, (header, rule)| match rule {
            Value::String(s) if s == ENTIRE_BLOCK => rules.with_entire_block(header),
            Value::Array(items) => {
                let lines = items
                    .iter()
                    .map(|item| {
                        item.as_str().ok_or_else(|| {
                            DriftError::parse(format!("rule '{}': line patterns must be strings", header))
                        })
                    })
                    .collect::<DriftResult<Vec<_>>>()?;
                rules.with_lines(header, &lines)
            }
            other => Err(DriftError::parse(format!(
                "rule '{}': expected \"{}\" or an array of patterns, got {}",
                header, ENTIRE_BLOCK, other
            ))),
        })
    }

    pub fn first_match(&self, header: &str) -> Option<&ExemptionRule> {
        self.entries
            .iter()
            .find(|(pattern, _)| pattern.is_match(header))
            .map(|(_, rule)| rule)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn compile(pattern: &str) -> DriftResult<Glob> {
    Glob::new(pattern).map_err(|e| DriftError::parse(format!("invalid pattern '{}': {}", pattern, e)))
}
