//! WCAG criterion references and POUR principle derivation.
//!
//! A WCAG success criterion is identified by a three-part dotted string
//! (`"1.1.1"`, `"2.4.4"`, ...). The first component names one of the four
//! top-level POUR principles; everything else about the criterion (its
//! title, level, description) is reference material we don't need to
//! reproduce to satisfy the spec, so this module stays small: parsing,
//! principle derivation, and a couple of well-known criteria used as
//! fallback defaults by the normalizer's rule table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four top-level WCAG principles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WCAGPrinciple {
    Perceivable,
    Operable,
    Understandable,
    Robust,
}

impl fmt::Display for WCAGPrinciple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Perceivable => write!(f, "PERCEIVABLE"),
            Self::Operable => write!(f, "OPERABLE"),
            Self::Understandable => write!(f, "UNDERSTANDABLE"),
            Self::Robust => write!(f, "ROBUST"),
        }
    }
}

impl WCAGPrinciple {
    /// Derive the principle from the first digit of a primary WCAG
    /// criterion string, per spec invariant (iii): `1→P, 2→O, 3→U, 4→R`.
    ///
    /// Returns `None` if the criterion doesn't start with a digit in
    /// `1..=4` (malformed criterion strings fall through to the
    /// normalizer's conservative default rather than panicking here).
    #[must_use]
    pub fn from_primary_criterion(criterion: &str) -> Option<Self> {
        match criterion.as_bytes().first() {
            Some(b'1') => Some(Self::Perceivable),
            Some(b'2') => Some(Self::Operable),
            Some(b'3') => Some(Self::Understandable),
            Some(b'4') => Some(Self::Robust),
            _ => None,
        }
    }
}

/// A WCAG success criterion reference, e.g. `"1.1.1"` or `"4.1.2"`.
///
/// Stored as the canonical dotted string rather than a parsed
/// `(principle, guideline, criterion)` triple: the rule table and every
/// scanner adapter produce and consume these as opaque strings, and only
/// the first digit is ever inspected (for POUR derivation).
pub type WCAGCriterion = String;

/// The conservative fallback criterion used when a scanner rule has no
/// entry in the rule table (spec §4.5 step 2): Robust / Parsing.
pub const DEFAULT_FALLBACK_CRITERION: &str = "4.1.1";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_principle_from_first_digit() {
        assert_eq!(
            WCAGPrinciple::from_primary_criterion("1.1.1"),
            Some(WCAGPrinciple::Perceivable)
        );
        assert_eq!(
            WCAGPrinciple::from_primary_criterion("2.4.4"),
            Some(WCAGPrinciple::Operable)
        );
        assert_eq!(
            WCAGPrinciple::from_primary_criterion("3.1.1"),
            Some(WCAGPrinciple::Understandable)
        );
        assert_eq!(
            WCAGPrinciple::from_primary_criterion("4.1.1"),
            Some(WCAGPrinciple::Robust)
        );
    }

    #[test]
    fn rejects_malformed_criterion() {
        assert_eq!(WCAGPrinciple::from_primary_criterion(""), None);
        assert_eq!(WCAGPrinciple::from_primary_criterion("x.1.1"), None);
    }
}
