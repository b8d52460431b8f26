//! Progress-percent formulas (spec §4.4): the session's `progress_percent`
//! field is recomputed from these pure functions at each stage transition
//! rather than incremented ad hoc, so the banding in §4.4 stays exact.

/// 0–10% during DISCOVERING, proportional to pages discovered against the
/// caller's own `max_pages` (not the hard cap the crawler additionally
/// applies — spec §4.4: "proportional to pages discovered / caller
/// max_pages").
#[must_use]
pub fn discovery_progress(pages_discovered: u32, caller_max_pages: u32) -> f64 {
    if caller_max_pages == 0 {
        return 10.0;
    }
    let ratio = f64::from(pages_discovered.min(caller_max_pages)) / f64::from(caller_max_pages);
    (ratio * 10.0).min(10.0)
}

/// SELECTING is a step function fixed at 15% (spec §4.4: "10–15% during
/// SELECTING (step function)" — the step lands at its end).
pub const SELECTING_PROGRESS: f64 = 15.0;

/// 15–90% during SCANNING: `15 + 75 * (completed / total)` (spec §4.4).
#[must_use]
pub fn scanning_progress(completed_units: usize, total_units: usize) -> f64 {
    if total_units == 0 {
        return 90.0;
    }
    15.0 + 75.0 * (completed_units as f64 / total_units as f64)
}

/// NORMALIZING starts at 90% (spec §4.4: "90–100% during NORMALIZING").
pub const NORMALIZING_START_PROGRESS: f64 = 90.0;
pub const COMPLETE_PROGRESS: f64 = 100.0;
