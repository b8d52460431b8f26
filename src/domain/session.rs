//! `ScanSession` and `DiscoverySession` — the two mutable entities in the
//! system, each owned by exactly one worker task (spec §3, §4.7).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::domain::outcome::ScannerOutcome;
use crate::domain::page::DiscoveredPage;
use crate::domain::request::ScanRequest;
use crate::domain::result::AggregatedResult;
use crate::error::FailureKind;

/// The scan-session state machine (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Pending,
    Discovering,
    Selecting,
    Scanning,
    Normalizing,
    Completed,
    Failed,
    Cancelled,
}

impl SessionState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Per-unit progress, keyed by `(page_url, scanner_label)` so it
/// serializes with plain string keys (spec §3 "per-page per-scanner
/// progress map").
pub type UnitProgressMap = BTreeMap<String, crate::domain::outcome::ScannerStatus>;

/// The mutable record the orchestrator owns for one scan (spec §3).
///
/// Mutated only by the owning worker task (single-writer invariant, spec
/// §5); reads elsewhere go through a point-in-time clone taken by the
/// session store (§4.7), never through a shared `&mut` reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSession {
    pub scan_id: Uuid,
    pub request: ScanRequest,
    pub state: SessionState,
    pub progress_percent: f64,
    pub unit_progress: UnitProgressMap,
    pub outcomes: Vec<ScannerOutcome>,
    pub result: Option<AggregatedResult>,
    /// Populated once `state` reaches `Failed` or `Cancelled`.
    pub failure_kind: Option<FailureKind>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Additional `AggregatedResult` versions appended by out-of-core
    /// collaborators (spec §4.7); `versions[0]` is always `v1`, the
    /// result produced by this scan's own normalization pass. Capped at
    /// 10, oldest-first eviction, enforced by the store rather than here.
    pub versions: Vec<AggregatedResult>,
    pub cancel_requested: bool,
}

impl ScanSession {
    #[must_use]
    pub fn new(scan_id: Uuid, request: ScanRequest, created_at: DateTime<Utc>) -> Self {
        Self {
            scan_id,
            request,
            state: SessionState::Pending,
            progress_percent: 0.0,
            unit_progress: BTreeMap::new(),
            outcomes: Vec::new(),
            result: None,
            failure_kind: None,
            created_at,
            completed_at: None,
            versions: Vec::new(),
            cancel_requested: false,
        }
    }
}

/// The mutable record C2 owns for one discovery run (spec §3: "same
/// lifecycle shape as ScanSession").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoverySession {
    pub discovery_id: Uuid,
    pub seed_url: String,
    pub max_pages: u32,
    pub max_depth: u32,
    pub state: SessionState,
    pub progress_percent: f64,
    pub pages: Vec<DiscoveredPage>,
    pub failure_kind: Option<FailureKind>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl DiscoverySession {
    #[must_use]
    pub fn new(discovery_id: Uuid, seed_url: String, max_pages: u32, max_depth: u32, created_at: DateTime<Utc>) -> Self {
        Self {
            discovery_id,
            seed_url,
            max_pages,
            max_depth,
            state: SessionState::Pending,
            progress_percent: 0.0,
            pages: Vec::new(),
            failure_kind: None,
            created_at,
            completed_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_are_exactly_completed_failed_cancelled() {
        assert!(SessionState::Completed.is_terminal());
        assert!(SessionState::Failed.is_terminal());
        assert!(SessionState::Cancelled.is_terminal());
        assert!(!SessionState::Scanning.is_terminal());
        assert!(!SessionState::Pending.is_terminal());
    }
}
