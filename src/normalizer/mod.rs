//! Normalizer & Scorer (C5, spec §4.5).

mod adapters;
mod pre_finding;
mod pipeline;
mod rule_table;

pub use pipeline::{normalize, ProcessingStats};
pub use rule_table::{fallback_entry, lookup, RuleEntry};
