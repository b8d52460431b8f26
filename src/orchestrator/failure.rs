//! Terminal failure-kind determination for the SCANNING completion
//! criterion (spec §4.4 failure model table).

use crate::domain::outcome::{ScannerOutcome, ScannerStatus};

/// `true` iff every recorded outcome is non-OK — the scan transitions to
/// FAILED with kind `ALL_SCANNERS_FAILED` (spec §4.4). An empty outcome
/// set (selection or scanner list was somehow empty) is deliberately
/// *not* treated as all-failed here; validation rejects empty scanner
/// sets at submission, and an empty selection never reaches SCANNING.
#[must_use]
pub fn all_scanners_failed(outcomes: &[ScannerOutcome]) -> bool {
    !outcomes.is_empty() && outcomes.iter().all(|o| o.status != ScannerStatus::Ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::outcome::ScannerId;
    use std::time::Duration;

    #[test]
    fn true_when_every_outcome_is_non_ok() {
        let outcomes = vec![
            ScannerOutcome::failed("http://x/a".into(), ScannerId::Pa11y, Duration::from_millis(1), "e".into()),
            ScannerOutcome::timed_out("http://x/a".into(), ScannerId::Axe, Duration::from_millis(1)),
        ];
        assert!(all_scanners_failed(&outcomes));
    }

    #[test]
    fn false_when_one_outcome_succeeds() {
        let outcomes = vec![
            ScannerOutcome::failed("http://x/a".into(), ScannerId::Pa11y, Duration::from_millis(1), "e".into()),
            ScannerOutcome::ok("http://x/a".into(), ScannerId::Axe, Duration::from_millis(1), serde_json::json!({})),
        ];
        assert!(!all_scanners_failed(&outcomes));
    }

    #[test]
    fn false_for_empty_outcome_set() {
        assert!(!all_scanners_failed(&[]));
    }
}
