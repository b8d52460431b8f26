//! `AggregatedResult` — the terminal output of a completed scan (spec §3, §4.5).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::domain::finding::Finding;

/// Overall compliance banding derived from `score` (spec §4.5 step 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceLevel {
    Compliant,
    PartiallyCompliant,
    NonCompliant,
}

impl ComplianceLevel {
    /// Score-band classification per spec §4.5 step 6:
    /// `>= 85` COMPLIANT, `[60, 85)` PARTIALLY_COMPLIANT, `< 60` NON_COMPLIANT.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            Self::Compliant
        } else if score >= 60.0 {
            Self::PartiallyCompliant
        } else {
            Self::NonCompliant
        }
    }
}

/// Per-scanner counts of terminal outcome statuses (spec §3).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerOutcomeSummary {
    pub ok: u32,
    pub failed: u32,
    pub timed_out: u32,
    pub skipped: u32,
}

impl ScannerOutcomeSummary {
    #[must_use]
    pub fn total(&self) -> u32 {
        self.ok + self.failed + self.timed_out + self.skipped
    }
}

/// The normalized, scored compliance report produced by C5 (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub scan_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub findings: Vec<Finding>,
    pub outcome_summary: BTreeMap<String, ScannerOutcomeSummary>,
    /// Keyed by [`crate::severity::Severity::label`] rather than the enum
    /// itself — keeps this report serializable with stable string keys
    /// independent of the enum's internal variant order.
    pub severity_totals: BTreeMap<String, u32>,
    /// Keyed by the principle's `Display` string (`PERCEIVABLE`, ...).
    pub pour_totals: BTreeMap<String, u32>,
    pub score: f64,
    pub compliance_level: ComplianceLevel,
    pub confidence: u8,
    pub executive_summary: Option<String>,
}
