//! Exemption filtering of line-based configuration text.

pub mod filter;
pub mod glob;
pub mod rules;

pub use filter::{apply, apply_to_envelope};
pub use rules::{ExemptionRule, ExemptionRuleSet};
