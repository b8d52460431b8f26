//! Per-scanner adapters: raw JSON → `Vec<PreFinding>` (spec §4.5 step 1).
//! Malformed or empty raw output yields zero pre-findings, never an error.

mod axe;
mod lighthouse;
mod pa11y;
mod wave;

use serde_json::Value;

use crate::domain::request::Scanner as ScannerId;
use crate::normalizer::pre_finding::PreFinding;

#[must_use]
pub fn parse(scanner: ScannerId, page_url: &str, raw: &Value) -> Vec<PreFinding> {
    match scanner {
        ScannerId::Wave => wave::parse(page_url, raw),
        ScannerId::Pa11y => pa11y::parse(page_url, raw),
        ScannerId::Axe => axe::parse(page_url, raw),
        ScannerId::Lighthouse => lighthouse::parse(page_url, raw),
    }
}
