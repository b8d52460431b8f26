//! `ScanEvent` — produced by C4, consumed by C6 → C8 (spec §3, §4.6).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::outcome::{ScannerId, ScannerStatus};
use crate::domain::result::AggregatedResult;
use crate::error::FailureKind;

/// The tag of a [`ScanEvent`] (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanEventType {
    ScanStart,
    DiscoveryProgress,
    PageProgress,
    ScannerStart,
    ScannerOperation,
    ScannerComplete,
    ScannerError,
    AggregationStart,
    ScanComplete,
    ScanFailed,
    Heartbeat,
}

impl ScanEventType {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::ScanComplete | Self::ScanFailed)
    }
}

/// Type-specific event payloads (spec §3: "payload (type-specific)").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanEventPayload {
    ScanStart {
        seed_url: String,
        enabled_scanners: Vec<ScannerId>,
    },
    DiscoveryProgress {
        pages_discovered: u32,
        max_pages: u32,
    },
    PageProgress {
        page_url: String,
        units_completed_for_page: u32,
        units_total_for_page: u32,
    },
    ScannerStart {
        page_url: String,
        scanner: ScannerId,
    },
    ScannerOperation {
        page_url: String,
        scanner: ScannerId,
        milestone: String,
    },
    ScannerComplete {
        page_url: String,
        scanner: ScannerId,
        status: ScannerStatus,
        duration_ms: u64,
    },
    ScannerError {
        page_url: String,
        scanner: ScannerId,
        failure_kind: FailureKind,
        message: String,
    },
    AggregationStart {
        total_outcomes: u32,
    },
    ScanComplete {
        result: Box<AggregatedResult>,
    },
    ScanFailed {
        failure_kind: FailureKind,
        message: String,
    },
    Heartbeat,
}

/// One totally-ordered (per scan id) progress event (spec §3).
///
/// Sequence numbers are assigned only for stored events; heartbeats carry
/// `seq = 0` as a sentinel meaning "not part of the sequence" (spec §4.6:
/// heartbeats don't consume sequence numbers), and are never placed in
/// the ring buffer by [`crate::events::EventBus`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanEvent {
    pub scan_id: Uuid,
    pub seq: u64,
    pub event_type: ScanEventType,
    pub timestamp: DateTime<Utc>,
    pub payload: ScanEventPayload,
}

impl ScanEvent {
    #[must_use]
    pub fn heartbeat(scan_id: Uuid, timestamp: DateTime<Utc>) -> Self {
        Self {
            scan_id,
            seq: 0,
            event_type: ScanEventType::Heartbeat,
            timestamp,
            payload: ScanEventPayload::Heartbeat,
        }
    }
}
