//! Canonicalization and line diff of configuration envelopes.

pub mod canonical;
pub mod compare;
pub mod unified;

pub use compare::{Comparison, ConfigDiffer};
pub use unified::{DiffLine, UnifiedDiff};
