//! `Finding` — one normalized accessibility issue (spec §3).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::request::Scanner as ScannerId;
use crate::severity::Severity;
use crate::wcag::{WCAGCriterion, WCAGPrinciple};

/// Disability categories a finding is believed to affect (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DisabilityImpact {
    Blind,
    LowVision,
    ColorBlind,
    Motor,
    Cognitive,
    Deaf,
}

/// A single normalized, deduplicated accessibility issue (spec §3).
///
/// `id` is content-addressed: a deterministic hash of `(scanner,
/// rule_code, page_url, element_selector, message[..200])` (spec §3,
/// §4.5 step 4), via `xxh3` — the same value it would be if recomputed
/// from identical inputs, which is what the normalizer's determinism
/// property (spec §8) relies on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub id: String,
    pub scanner: ScannerId,
    pub rule_code: String,
    pub severity: Severity,
    pub wcag_criteria: Vec<WCAGCriterion>,
    pub pour: WCAGPrinciple,
    pub disability_impact: BTreeSet<DisabilityImpact>,
    pub element_selector: Option<String>,
    pub context_snippet: Option<String>,
    pub description: String,
    pub remediation: String,
    pub page_url: String,
    pub occurrence_count: u32,
}

/// Truncate `context_snippet` content to 200 chars as required by spec §3;
/// called on construction so every `Finding` in the tree already satisfies
/// the invariant rather than relying on callers to truncate.
const MAX_CONTEXT_CHARS: usize = 200;

impl Finding {
    /// Compute the stable content-addressed id (spec §3, §4.5 step 4).
    ///
    /// `message` is the pre-finding's raw message, not the final
    /// description — per spec, the hash is over "message fragment",
    /// truncated to its first 200 chars before hashing, matching the
    /// truncation applied to `context_snippet`.
    #[must_use]
    pub fn compute_id(
        scanner: ScannerId,
        rule_code: &str,
        page_url: &str,
        element_selector: Option<&str>,
        message: &str,
    ) -> String {
        use xxhash_rust::xxh3::xxh3_64;

        let truncated_message: String = message.chars().take(MAX_CONTEXT_CHARS).collect();
        let key = format!(
            "{}\u{1}{}\u{1}{}\u{1}{}\u{1}{}",
            scanner.label(),
            rule_code,
            page_url,
            element_selector.unwrap_or(""),
            truncated_message,
        );
        format!("{:016x}", xxh3_64(key.as_bytes()))
    }

    /// The dedup key used by the normalizer (spec §4.5 step 5):
    /// `(rule_code, page_url, element_selector, context[..80])`. Note this
    /// is *not* the same key as the id hash (message vs context, 80 vs
    /// 200 chars) — spec §9 explicitly calls out that dedup-by-rule-code-only
    /// is the legacy behavior being superseded by this fuller key.
    #[must_use]
    pub fn dedup_key(&self) -> (String, String, String, String) {
        let context_prefix: String = self
            .context_snippet
            .as_deref()
            .unwrap_or("")
            .chars()
            .take(80)
            .collect();
        (
            self.rule_code.clone(),
            self.page_url.clone(),
            self.element_selector.clone().unwrap_or_default(),
            context_prefix,
        )
    }

    pub fn truncate_context(snippet: &str) -> String {
        snippet.chars().take(MAX_CONTEXT_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_deterministic_for_identical_inputs() {
        let a = Finding::compute_id(ScannerId::Pa11y, "WCAG2AA.Principle1", "http://x/a", Some("#btn"), "missing alt");
        let b = Finding::compute_id(ScannerId::Pa11y, "WCAG2AA.Principle1", "http://x/a", Some("#btn"), "missing alt");
        assert_eq!(a, b);
    }

    #[test]
    fn id_differs_for_different_rule_code() {
        let a = Finding::compute_id(ScannerId::Pa11y, "rule.a", "http://x/a", None, "msg");
        let b = Finding::compute_id(ScannerId::Pa11y, "rule.b", "http://x/a", None, "msg");
        assert_ne!(a, b);
    }

    #[test]
    fn context_truncation_respects_200_char_cap() {
        let long = "a".repeat(500);
        assert_eq!(Finding::truncate_context(&long).chars().count(), 200);
    }
}
