//! The fixed `(scanner, rule-code) → {wcag, severity, impact, remediation}`
//! mapping table (spec §4.5 step 2): "a fixed table (≥ 40 entries
//! covering the common rules per scanner)". Entries missing from the
//! table fall through to [`fallback_entry`].

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::domain::finding::DisabilityImpact;
use crate::domain::request::Scanner as ScannerId;
use crate::severity::Severity;
use crate::wcag::DEFAULT_FALLBACK_CRITERION;

use DisabilityImpact::{Blind, Cognitive, ColorBlind, Deaf, LowVision, Motor};

/// A rule table entry: everything the normalizer needs beyond what the
/// raw pre-finding already carries (spec §4.5 step 2).
#[derive(Debug, Clone, Copy)]
pub struct RuleEntry {
    pub wcag_criteria: &'static [&'static str],
    pub severity: Severity,
    pub disability_impact: &'static [DisabilityImpact],
    pub remediation: &'static str,
}

/// The conservative fallback applied when `(scanner, rule_code)` has no
/// table entry (spec §4.5 step 2): MEDIUM severity, WCAG 4.1.1, impact
/// COGNITIVE. Callers also increment a fallback counter for observability.
#[must_use]
pub fn fallback_entry() -> RuleEntry {
    RuleEntry {
        wcag_criteria: &[DEFAULT_FALLBACK_CRITERION_STATIC],
        severity: Severity::Medium,
        disability_impact: &[Cognitive],
        remediation: "Review this finding manually against the relevant WCAG success criterion.",
    }
}

// `DEFAULT_FALLBACK_CRITERION` is a `const &str`, reused here under a
// distinct name only because `&'static [&'static str]` array literals
// need a `'static` item to reference, and re-exporting the wcag module's
// const directly inline keeps this file self-contained.
const DEFAULT_FALLBACK_CRITERION_STATIC: &str = DEFAULT_FALLBACK_CRITERION;

/// Resolve a rule entry, returning whether it was the conservative
/// fallback (no table entry matched) alongside the entry itself.
#[must_use]
pub fn lookup(scanner: ScannerId, rule_code: &str) -> (RuleEntry, bool) {
    match RULE_TABLE.get(&(scanner, rule_code)) {
        Some(entry) => (*entry, false),
        None => (fallback_entry(), true),
    }
}

static RULE_TABLE: Lazy<HashMap<(ScannerId, &'static str), RuleEntry>> = Lazy::new(|| {
    let mut m = HashMap::new();

    macro_rules! entry {
        ($scanner:expr, $code:expr, $wcag:expr, $severity:expr, $impact:expr, $remediation:expr) => {
            m.insert(
                ($scanner, $code),
                RuleEntry {
                    wcag_criteria: $wcag,
                    severity: $severity,
                    disability_impact: $impact,
                    remediation: $remediation,
                },
            );
        };
    }

    // --- WAVE ---
    entry!(ScannerId::Wave, "alt_missing", &["1.1.1"], Severity::Critical, &[Blind, LowVision], "Add descriptive alt text to the image.");
    entry!(ScannerId::Wave, "alt_spacer_missing", &["1.1.1"], Severity::Low, &[Blind], "Add empty alt=\"\" to decorative spacer images.");
    entry!(ScannerId::Wave, "alt_input_missing", &["1.1.1", "4.1.2"], Severity::High, &[Blind, Motor], "Add alt text to the image button.");
    entry!(ScannerId::Wave, "label_missing", &["1.3.1", "4.1.2"], Severity::High, &[Blind, Motor, Cognitive], "Associate a <label> with this form field.");
    entry!(ScannerId::Wave, "link_empty", &["2.4.4", "4.1.2"], Severity::High, &[Blind], "Give the link discernible text.");
    entry!(ScannerId::Wave, "button_empty", &["4.1.2"], Severity::High, &[Blind], "Give the button an accessible name.");
    entry!(ScannerId::Wave, "heading_empty", &["1.3.1"], Severity::Medium, &[Blind, Cognitive], "Remove the empty heading or give it content.");
    entry!(ScannerId::Wave, "heading_skipped", &["1.3.1"], Severity::Low, &[Cognitive], "Use heading levels in sequential order.");
    entry!(ScannerId::Wave, "contrast", &["1.4.3"], Severity::Medium, &[LowVision, ColorBlind], "Increase the color contrast ratio to at least 4.5:1.");
    entry!(ScannerId::Wave, "language_missing", &["3.1.1"], Severity::Medium, &[Blind, Deaf], "Declare the page language with the html lang attribute.");
    entry!(ScannerId::Wave, "title_invalid", &["2.4.2"], Severity::Medium, &[Blind, Cognitive], "Give the document a descriptive <title>.");
    entry!(ScannerId::Wave, "fieldset_missing", &["1.3.1"], Severity::Medium, &[Blind, Cognitive], "Group related form fields in a <fieldset> with a <legend>.");

    // --- PA11Y (codes follow the WCAG2AA Pa11y ruleset convention) ---
    entry!(ScannerId::Pa11y, "WCAG2AA.Principle1.Guideline1_1.1_1_1.H37", &["1.1.1"], Severity::Critical, &[Blind, LowVision], "Add descriptive alt text to the image.");
    entry!(ScannerId::Pa11y, "WCAG2AA.Principle1.Guideline1_3.1_3_1.F68", &["1.3.1"], Severity::High, &[Blind, Motor], "Associate a <label> with this form field.");
    entry!(ScannerId::Pa11y, "WCAG2AA.Principle4.Guideline4_1.4_1_2.H91.InputText.Name", &["4.1.2"], Severity::High, &[Blind, Motor], "Give the input an accessible name.");
    entry!(ScannerId::Pa11y, "WCAG2AA.Principle1.Guideline1_4.1_4_3.G18.Fail", &["1.4.3"], Severity::Medium, &[LowVision, ColorBlind], "Increase the color contrast ratio.");
    entry!(ScannerId::Pa11y, "WCAG2AA.Principle2.Guideline2_4.2_4_4.H77,H78,H79,H80,H81", &["2.4.4"], Severity::High, &[Blind, Cognitive], "Make link text describe its destination.");
    entry!(ScannerId::Pa11y, "WCAG2AA.Principle2.Guideline2_4.2_4_2.H25.1.NoTitleEl", &["2.4.2"], Severity::Medium, &[Blind, Cognitive], "Give the document a descriptive <title>.");
    entry!(ScannerId::Pa11y, "WCAG2AA.Principle3.Guideline3_1.3_1_1.H57.2", &["3.1.1"], Severity::Medium, &[Blind, Deaf], "Declare the page language.");
    entry!(ScannerId::Pa11y, "WCAG2AA.Principle1.Guideline1_3.1_3_1.H42", &["1.3.1"], Severity::Low, &[Cognitive], "Use semantic heading markup, not styled text.");
    entry!(ScannerId::Pa11y, "WCAG2AA.Principle4.Guideline4_1.4_1_1.F77", &["4.1.1"], Severity::Medium, &[Blind, Motor], "Fix duplicate element ids.");
    entry!(ScannerId::Pa11y, "WCAG2AA.Principle2.Guideline2_1.2_1_1.G90", &["2.1.1"], Severity::High, &[Motor], "Ensure the control is keyboard operable.");

    // --- AXE ---
    entry!(ScannerId::Axe, "image-alt", &["1.1.1"], Severity::Critical, &[Blind, LowVision], "Add descriptive alt text to the image.");
    entry!(ScannerId::Axe, "label", &["1.3.1", "4.1.2"], Severity::High, &[Blind, Motor, Cognitive], "Associate a <label> with this form field.");
    entry!(ScannerId::Axe, "link-name", &["2.4.4", "4.1.2"], Severity::High, &[Blind], "Give the link discernible text.");
    entry!(ScannerId::Axe, "button-name", &["4.1.2"], Severity::High, &[Blind], "Give the button an accessible name.");
    entry!(ScannerId::Axe, "color-contrast", &["1.4.3"], Severity::Medium, &[LowVision, ColorBlind], "Increase the color contrast ratio.");
    entry!(ScannerId::Axe, "html-has-lang", &["3.1.1"], Severity::Medium, &[Blind, Deaf], "Declare the page language.");
    entry!(ScannerId::Axe, "document-title", &["2.4.2"], Severity::Medium, &[Blind, Cognitive], "Give the document a descriptive <title>.");
    entry!(ScannerId::Axe, "heading-order", &["1.3.1"], Severity::Low, &[Cognitive], "Use heading levels in sequential order.");
    entry!(ScannerId::Axe, "duplicate-id-aria", &["4.1.1"], Severity::Medium, &[Blind, Motor], "Fix duplicate element ids referenced by ARIA.");
    entry!(ScannerId::Axe, "aria-required-attr", &["4.1.2"], Severity::High, &[Blind, Motor], "Add the required ARIA attribute.");
    entry!(ScannerId::Axe, "frame-title", &["2.4.1", "4.1.2"], Severity::Medium, &[Blind], "Give the iframe a descriptive title.");
    entry!(ScannerId::Axe, "meta-viewport", &["1.4.4"], Severity::Medium, &[LowVision], "Allow pinch-zoom; do not disable user scaling.");

    // --- LIGHTHOUSE (accessibility audit ids) ---
    entry!(ScannerId::Lighthouse, "image-alt", &["1.1.1"], Severity::Critical, &[Blind, LowVision], "Add descriptive alt text to the image.");
    entry!(ScannerId::Lighthouse, "label", &["1.3.1", "4.1.2"], Severity::High, &[Blind, Motor, Cognitive], "Associate a <label> with this form field.");
    entry!(ScannerId::Lighthouse, "link-name", &["2.4.4", "4.1.2"], Severity::High, &[Blind], "Give the link discernible text.");
    entry!(ScannerId::Lighthouse, "button-name", &["4.1.2"], Severity::High, &[Blind], "Give the button an accessible name.");
    entry!(ScannerId::Lighthouse, "color-contrast", &["1.4.3"], Severity::Medium, &[LowVision, ColorBlind], "Increase the color contrast ratio.");
    entry!(ScannerId::Lighthouse, "html-has-lang", &["3.1.1"], Severity::Medium, &[Blind, Deaf], "Declare the page language.");
    entry!(ScannerId::Lighthouse, "document-title", &["2.4.2"], Severity::Medium, &[Blind, Cognitive], "Give the document a descriptive <title>.");
    entry!(ScannerId::Lighthouse, "tabindex", &["2.4.3"], Severity::Medium, &[Motor], "Avoid positive tabindex values; follow natural DOM order.");
    entry!(ScannerId::Lighthouse, "duplicate-id-active", &["4.1.1"], Severity::Low, &[Motor], "Fix duplicate ids on focusable elements.");
    entry!(ScannerId::Lighthouse, "video-caption", &["1.2.2"], Severity::High, &[Deaf], "Provide captions for the video.");

    m
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_at_least_forty_entries() {
        assert!(RULE_TABLE.len() >= 40, "table has {} entries", RULE_TABLE.len());
    }

    #[test]
    fn known_rule_resolves_to_its_entry() {
        let (entry, is_fallback) = lookup(ScannerId::Axe, "image-alt");
        assert_eq!(entry.severity, Severity::Critical);
        assert_eq!(entry.wcag_criteria, &["1.1.1"]);
        assert!(!is_fallback);
    }

    #[test]
    fn unknown_rule_falls_back_to_conservative_default() {
        let (entry, is_fallback) = lookup(ScannerId::Axe, "nonexistent-rule-xyz");
        assert_eq!(entry.severity, Severity::Medium);
        assert_eq!(entry.wcag_criteria, &["4.1.1"]);
        assert_eq!(entry.disability_impact, &[Cognitive]);
        assert!(is_fallback);
    }
}
