use serde_json::Value;
use tracing::debug;

use crate::diff::canonical::canonical_lines;
use crate::diff::unified::{UnifiedDiff, CONTEXT_LINES};

pub const DEFAULT_FROM_LABEL: &str = "template.json";
pub const DEFAULT_TO_LABEL: &str = "live_config.json";

/// Outcome of comparing a reference document against a live one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub equal: bool,
    pub added: usize,
    pub removed: usize,
    /// Only rendered when the documents differ.
    pub diff: Option<UnifiedDiff>,
}

#[derive(Debug, Clone)]
pub struct ConfigDiffer {
    from_label: String,
    to_label: String,
}

impl Default for ConfigDiffer {
    fn default() -> Self {
        Self::new(DEFAULT_FROM_LABEL, DEFAULT_TO_LABEL)
    }
}

impl ConfigDiffer {
    pub fn new(from_label: impl Into<String>, to_label: impl Into<String>) -> Self {
        Self {
            from_label: from_label.into(),
            to_label: to_label.into(),
        }
    }

    /// Lines in the result marked as added exist only in `b`, removed ones only in `a`.
    pub fn compare(&self, a: &Value, b: &Value) -> Comparison {
        let old = canonical_lines(a);
        let new = canonical_lines(b);

        if old == new {
            return Comparison { equal: true, added: 0, removed: 0, diff: None };
        }

        let diff = UnifiedDiff::new(&old[..], &new[..], &self.from_label, &self.to_label, CONTEXT_LINES);
        let (added, removed) = (diff.added(), diff.removed());
        debug!("documents differ: +{} -{}", added, removed);
        Comparison { equal: false, added, removed, diff: Some(diff) }
    }
}
