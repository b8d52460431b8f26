//! The normalization pipeline (C5, spec §4.5): pure, deterministic,
//! `list<ScannerOutcome> -> AggregatedResult`.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use crate::domain::finding::Finding;
use crate::domain::outcome::{ScannerOutcome, ScannerStatus};
use crate::domain::result::{AggregatedResult, ComplianceLevel, ScannerOutcomeSummary};
use crate::normalizer::adapters;
use crate::normalizer::rule_table::lookup;
use crate::severity::Severity;
use crate::wcag::WCAGPrinciple;

/// Observability counters for the stages that silently drop or fall back
/// rather than erroring (spec §4.5: "such fall-throughs are counted for
/// observability"; "each missing value increments a named counter").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProcessingStats {
    pub rule_table_fallbacks: u32,
    pub findings_dropped_no_criterion: u32,
}

/// Run the full pipeline (spec §4.5 steps 1–7). `generated_at` is passed
/// in rather than read from the clock here, keeping this function pure
/// and the determinism property (spec §8) checkable without mocking time.
#[must_use]
pub fn normalize(scan_id: Uuid, outcomes: &[ScannerOutcome], generated_at: DateTime<Utc>) -> (AggregatedResult, ProcessingStats) {
    let mut stats = ProcessingStats::default();

    // Step 1 + 2 + 3 + 4: parse, rule-lookup, POUR-derive, construct.
    let mut findings: Vec<Finding> = Vec::new();
    for outcome in outcomes {
        if outcome.status != ScannerStatus::Ok {
            continue;
        }
        let Some(raw) = &outcome.raw_output else { continue };
        let pre_findings = adapters::parse(outcome.scanner, &outcome.page_url, raw);

        for pre in pre_findings {
            let (entry, is_fallback) = lookup(outcome.scanner, &pre.rule_code);
            if is_fallback {
                stats.rule_table_fallbacks += 1;
            }

            let Some(primary_criterion) = entry.wcag_criteria.first() else {
                stats.findings_dropped_no_criterion += 1;
                continue;
            };
            let Some(pour) = WCAGPrinciple::from_primary_criterion(primary_criterion) else {
                stats.findings_dropped_no_criterion += 1;
                continue;
            };

            let context_snippet = pre.context.as_deref().map(Finding::truncate_context);
            let id = Finding::compute_id(
                outcome.scanner,
                &pre.rule_code,
                &pre.page_url,
                pre.element_selector.as_deref(),
                &pre.message,
            );

            findings.push(Finding {
                id,
                scanner: outcome.scanner,
                rule_code: pre.rule_code,
                severity: entry.severity,
                wcag_criteria: entry.wcag_criteria.iter().map(|s| (*s).to_string()).collect(),
                pour,
                disability_impact: entry.disability_impact.iter().copied().collect(),
                element_selector: pre.element_selector,
                context_snippet,
                description: pre.message,
                remediation: entry.remediation.to_string(),
                page_url: pre.page_url,
                occurrence_count: 1,
            });
        }
    }

    // Step 5: dedup by (rule_code, page_url, element_selector, context[..80]),
    // keep the highest-severity finding per group, occurrence_count = group size.
    let mut groups: HashMap<(String, String, String, String), Vec<Finding>> = HashMap::new();
    for finding in findings {
        groups.entry(finding.dedup_key()).or_default().push(finding);
    }

    let mut deduped: Vec<Finding> = groups
        .into_values()
        .map(|mut group| {
            group.sort_by(|a, b| b.severity.cmp(&a.severity));
            let mut kept = group.remove(0);
            kept.occurrence_count = (group.len() + 1) as u32;
            kept
        })
        .collect();

    // Stable order: descending severity, then rule-code, then page URL (spec §4.5 determinism).
    deduped.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.rule_code.cmp(&b.rule_code))
            .then_with(|| a.page_url.cmp(&b.page_url))
    });

    // Per-scanner outcome summary.
    let mut outcome_summary: BTreeMap<String, ScannerOutcomeSummary> = BTreeMap::new();
    for outcome in outcomes {
        let entry = outcome_summary.entry(outcome.scanner.label().to_string()).or_default();
        match outcome.status {
            ScannerStatus::Ok => entry.ok += 1,
            ScannerStatus::Failed => entry.failed += 1,
            ScannerStatus::TimedOut => entry.timed_out += 1,
            ScannerStatus::Skipped => entry.skipped += 1,
        }
    }

    // Per-severity / per-POUR totals (summed occurrences).
    let mut severity_totals: BTreeMap<String, u32> = BTreeMap::new();
    let mut pour_totals: BTreeMap<String, u32> = BTreeMap::new();
    for finding in &deduped {
        *severity_totals.entry(finding.severity.label().to_string()).or_insert(0) += finding.occurrence_count;
        *pour_totals.entry(finding.pour.to_string()).or_insert(0) += finding.occurrence_count;
    }

    // Step 6: scoring. R = 8c + 4h + 2m + 0.5l, capped at 75; score = max(0, 100 - R).
    let c = f64::from(*severity_totals.get(Severity::Critical.label()).unwrap_or(&0));
    let h = f64::from(*severity_totals.get(Severity::High.label()).unwrap_or(&0));
    let m = f64::from(*severity_totals.get(Severity::Medium.label()).unwrap_or(&0));
    let l = f64::from(*severity_totals.get(Severity::Low.label()).unwrap_or(&0));
    let raw_penalty = c * Severity::Critical.penalty_weight()
        + h * Severity::High.penalty_weight()
        + m * Severity::Medium.penalty_weight()
        + l * Severity::Low.penalty_weight();
    let penalty = raw_penalty.min(75.0);
    let score = (100.0 - penalty).max(0.0);
    let compliance_level = ComplianceLevel::from_score(score);

    // Step 7: confidence = 100 * successful / total, rounded.
    let total_outcomes = outcomes.len();
    let successful_outcomes = outcomes.iter().filter(|o| o.is_successful()).count();
    let confidence = if total_outcomes == 0 {
        0
    } else {
        (100.0 * successful_outcomes as f64 / total_outcomes as f64).round() as u8
    };

    let result = AggregatedResult {
        scan_id,
        generated_at,
        findings: deduped,
        outcome_summary,
        severity_totals,
        pour_totals,
        score,
        compliance_level,
        confidence,
        executive_summary: None,
    };

    (result, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::outcome::ScannerId;
    use std::time::Duration;

    fn ok_outcome(scanner: ScannerId, url: &str, raw: serde_json::Value) -> ScannerOutcome {
        ScannerOutcome::ok(url.to_string(), scanner, Duration::from_millis(1), raw)
    }

    /// Builds one AXE `violations` entry whose `nodes` carry `count`
    /// distinct selectors, so each node survives dedup as its own
    /// finding (dedup groups by selector among other things) rather
    /// than collapsing into one finding with a higher occurrence_count.
    fn axe_violation(rule_id: &str, count: usize) -> serde_json::Value {
        let nodes: Vec<_> = (0..count)
            .map(|i| serde_json::json!({"target": [format!("#{rule_id}-{i}")], "html": "<x>"}))
            .collect();
        serde_json::json!({"id": rule_id, "impact": "n/a", "description": "d", "nodes": nodes})
    }

    /// Seed scenario 5 (spec §8): rule-table lookups for real AXE rule
    /// codes (`image-alt` -> CRITICAL, `label`/`link-name` -> HIGH,
    /// `color-contrast` -> MEDIUM, `heading-order` -> LOW) drive the
    /// scorer through `ScannerOutcome` -> `normalize`, producing
    /// c=2, h=6, m=4, l=3 -> R = 16+24+8+1.5 = 49.5 -> score = 50.5,
    /// which is NON_COMPLIANT (< 60).
    #[test]
    fn score_and_compliance_level_reflect_real_rule_table_severities() {
        let raw = serde_json::json!({
            "violations": [
                axe_violation("image-alt", 2),    // CRITICAL x2
                axe_violation("label", 3),         // HIGH x3
                axe_violation("link-name", 3),      // HIGH x3
                axe_violation("color-contrast", 4), // MEDIUM x4
                axe_violation("heading-order", 3),  // LOW x3
            ]
        });
        let outcomes = vec![ok_outcome(ScannerId::Axe, "http://x/a", raw)];
        let (result, _stats) = normalize(Uuid::nil(), &outcomes, Utc::now());

        assert_eq!(result.score, 50.5);
        assert_eq!(result.compliance_level, ComplianceLevel::NonCompliant);
        assert_eq!(*result.severity_totals.get(Severity::Critical.label()).unwrap(), 2);
        assert_eq!(*result.severity_totals.get(Severity::High.label()).unwrap(), 6);
        assert_eq!(*result.severity_totals.get(Severity::Medium.label()).unwrap(), 4);
        assert_eq!(*result.severity_totals.get(Severity::Low.label()).unwrap(), 3);
    }

    /// The raw penalty is capped at 75 (spec §4.5 step 6) before being
    /// subtracted from 100, so a pile-up of CRITICAL findings never
    /// drives the score below 25.
    #[test]
    fn raw_penalty_above_cap_is_clamped_to_75() {
        let raw = serde_json::json!({"violations": [axe_violation("image-alt", 10)]}); // 10 * 8 = 80 > 75
        let outcomes = vec![ok_outcome(ScannerId::Axe, "http://x/a", raw)];
        let (result, _stats) = normalize(Uuid::nil(), &outcomes, Utc::now());

        assert_eq!(result.score, 25.0);
        assert_eq!(result.compliance_level, ComplianceLevel::NonCompliant);
    }

    #[test]
    fn zero_findings_yield_compliant_level() {
        let outcomes = vec![ok_outcome(ScannerId::Axe, "http://x/a", serde_json::json!({"violations": []}))];
        let (result, _stats) = normalize(Uuid::nil(), &outcomes, Utc::now());
        assert_eq!(result.score, 100.0);
        assert_eq!(result.compliance_level, ComplianceLevel::Compliant);
    }

    #[test]
    fn confidence_rounds_partial_success() {
        let outcomes = vec![
            ok_outcome(ScannerId::Axe, "http://x/a", serde_json::json!({"violations": []})),
            ScannerOutcome::failed("http://x/a".into(), ScannerId::Pa11y, Duration::from_millis(1), "boom".into()),
            ok_outcome(ScannerId::Wave, "http://x/a", serde_json::json!({"categories": {}})),
            ScannerOutcome::timed_out("http://x/a".into(), ScannerId::Lighthouse, Duration::from_millis(1)),
        ];
        let (_result, _stats) = normalize(Uuid::nil(), &outcomes, Utc::now());
        let successful = outcomes.iter().filter(|o| o.is_successful()).count();
        let confidence = (100.0 * successful as f64 / outcomes.len() as f64).round() as u8;
        assert_eq!(confidence, 50);
    }

    #[test]
    fn dedup_keeps_highest_severity_and_sums_occurrences() {
        let raw = serde_json::json!({
            "violations": [{
                "id": "image-alt", "impact": "critical", "description": "d",
                "nodes": [{"target": ["img.a"], "html": "<img>"}, {"target": ["img.a"], "html": "<img>"}]
            }]
        });
        let outcomes = vec![ok_outcome(ScannerId::Axe, "http://x/a", raw)];
        let (result, _stats) = normalize(Uuid::nil(), &outcomes, Utc::now());
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].occurrence_count, 2);
    }

    #[test]
    fn empty_outcomes_yield_perfect_score_and_zero_confidence() {
        let (result, _stats) = normalize(Uuid::nil(), &[], Utc::now());
        assert_eq!(result.score, 100.0);
        assert_eq!(result.confidence, 0);
        assert!(result.findings.is_empty());
    }

    #[test]
    fn running_twice_on_same_outcomes_is_deterministic() {
        let raw = serde_json::json!({"violations": [{"id": "image-alt", "impact": "critical", "description": "d", "nodes": [{"target": ["img.a"], "html": "<img>"}]}]});
        let outcomes = vec![ok_outcome(ScannerId::Axe, "http://x/a", raw)];
        let (a, _) = normalize(Uuid::nil(), &outcomes, Utc::now());
        let (b, _) = normalize(Uuid::nil(), &outcomes, Utc::now());
        assert_eq!(a.findings.iter().map(|f| &f.id).collect::<Vec<_>>(), b.findings.iter().map(|f| &f.id).collect::<Vec<_>>());
    }
}
