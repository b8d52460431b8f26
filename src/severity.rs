//! Finding severity, as fixed by the rule table (never from raw scanner
//! severity strings — spec invariant (i) on `Finding`).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Severity of a normalized [`crate::domain::Finding`].
///
/// Ordered so that `Critical > High > Medium > Low`; used both for the
/// dedup-group "keep highest severity" rule (spec §4.5 step 5) and for the
/// stable sort order of the final finding list (descending severity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Penalty weight used by the scorer (spec §4.5 step 6).
    #[must_use]
    pub fn penalty_weight(self) -> f64 {
        match self {
            Self::Critical => 8.0,
            Self::High => 4.0,
            Self::Medium => 2.0,
            Self::Low => 0.5,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        // Derive(PartialEq) on the enum already orders variants by
        // declaration (Low < Medium < High < Critical); spelled out
        // explicitly here so the ordering survives variant reordering.
        fn rank(s: Severity) -> u8 {
            match s {
                Severity::Low => 0,
                Severity::Medium => 1,
                Severity::High => 2,
                Severity::Critical => 3,
            }
        }
        rank(*self).cmp(&rank(*other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_critical_above_low() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn penalty_weights_match_spec_formula() {
        assert_eq!(Severity::Critical.penalty_weight(), 8.0);
        assert_eq!(Severity::High.penalty_weight(), 4.0);
        assert_eq!(Severity::Medium.penalty_weight(), 2.0);
        assert_eq!(Severity::Low.penalty_weight(), 0.5);
    }
}
