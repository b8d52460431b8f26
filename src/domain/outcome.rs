//! `ScannerOutcome` — the result of one (page, scanner) unit of work
//! (spec §3, §4.4).

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use crate::domain::request::Scanner as ScannerId;

/// Terminal status of one unit of work. Exactly one is recorded per
/// (page, scanner) pair (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScannerStatus {
    Ok,
    Failed,
    TimedOut,
    Skipped,
}

/// The outcome of invoking one driver against one page (spec §3).
///
/// `raw_output` is opaque to everything except the driver that produced
/// it and the normalizer's matching adapter (spec §3: "opaque to
/// everything except..."); it is `None` for non-OK outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannerOutcome {
    pub page_url: String,
    pub scanner: ScannerId,
    pub status: ScannerStatus,
    #[serde(with = "duration_millis")]
    pub duration: Duration,
    pub raw_output: Option<serde_json::Value>,
    pub error_message: Option<String>,
}

impl ScannerOutcome {
    #[must_use]
    pub fn ok(page_url: String, scanner: ScannerId, duration: Duration, raw_output: serde_json::Value) -> Self {
        Self {
            page_url,
            scanner,
            status: ScannerStatus::Ok,
            duration,
            raw_output: Some(raw_output),
            error_message: None,
        }
    }

    #[must_use]
    pub fn failed(page_url: String, scanner: ScannerId, duration: Duration, error_message: String) -> Self {
        Self {
            page_url,
            scanner,
            status: ScannerStatus::Failed,
            duration,
            raw_output: None,
            error_message: Some(error_message),
        }
    }

    #[must_use]
    pub fn timed_out(page_url: String, scanner: ScannerId, duration: Duration) -> Self {
        Self {
            page_url,
            scanner,
            status: ScannerStatus::TimedOut,
            duration,
            raw_output: None,
            error_message: Some(crate::error::DriverError::TimedOut(duration).to_string()),
        }
    }

    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.status == ScannerStatus::Ok
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u128(d.as_millis())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(d)?;
        Ok(Duration::from_millis(millis))
    }
}
