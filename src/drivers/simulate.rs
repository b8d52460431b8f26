//! Simulate mode (spec §4.3, §9 glossary): each driver returns a canned
//! OK outcome with a deterministic raw-finding set, keyed by a hash of
//! the URL, so the whole pipeline is exercisable without external tools.
//!
//! The shapes produced here are exactly what the corresponding
//! `normalizer::adapters` module expects — simulate mode exercises the
//! real adapter code path, not a shortcut around it.

use std::time::Duration;
use xxhash_rust::xxh3::xxh3_64;

use crate::domain::outcome::{ScannerId, ScannerOutcome};

fn url_bucket(url: &str, modulus: u64) -> u64 {
    xxh3_64(url.as_bytes()) % modulus
}

pub async fn drive_simulated(scanner: ScannerId, url: &str) -> ScannerOutcome {
    let duration = Duration::from_millis(5);
    let raw = match scanner {
        ScannerId::Wave => simulated_wave(url),
        ScannerId::Pa11y => simulated_pa11y(url),
        ScannerId::Axe => simulated_axe(url),
        ScannerId::Lighthouse => simulated_lighthouse(url),
    };
    ScannerOutcome::ok(url.to_string(), scanner, duration, raw)
}

fn simulated_wave(url: &str) -> serde_json::Value {
    let has_alert = url_bucket(url, 2) == 0;
    let mut alert_items = serde_json::Map::new();
    if has_alert {
        alert_items.insert(
            "label_missing".to_string(),
            serde_json::json!({"count": 1, "description": "Missing form label", "selectors": ["input#email"]}),
        );
    }
    serde_json::json!({
        "categories": {
            "error": {
                "count": 2,
                "items": {
                    "alt_missing": {
                        "count": 2,
                        "description": "Missing alternative text",
                        "selectors": ["img.logo", "img.banner"],
                    }
                }
            },
            "alert": {
                "count": if has_alert { 1 } else { 0 },
                "items": alert_items,
            }
        }
    })
}

fn simulated_pa11y(url: &str) -> serde_json::Value {
    let mut issues = vec![serde_json::json!({
        "code": "WCAG2AA.Principle1.Guideline1_1.1_1_1.H37",
        "type": "error",
        "message": "Img element missing an alt attribute.",
        "selector": "img.logo",
        "context": "<img class=\"logo\">",
    })];
    if url_bucket(url, 2) == 1 {
        issues.push(serde_json::json!({
            "code": "WCAG2AA.Principle4.Guideline4_1.4_1_2.H91.InputText.Name",
            "type": "error",
            "message": "This form field does not have a name available to an accessibility API.",
            "selector": "input#email",
            "context": "<input id=\"email\">",
        }));
    }
    serde_json::Value::Array(issues)
}

fn simulated_axe(url: &str) -> serde_json::Value {
    let impact = if url_bucket(url, 3) == 0 { "serious" } else { "critical" };
    serde_json::json!({
        "violations": [
            {
                "id": "image-alt",
                "impact": impact,
                "description": "Images must have alternate text",
                "nodes": [
                    {"target": ["img.logo"], "html": "<img class=\"logo\">", "failureSummary": "Fix: Add alt attribute"}
                ]
            }
        ]
    })
}

fn simulated_lighthouse(url: &str) -> serde_json::Value {
    let score = if url_bucket(url, 2) == 0 { 0 } else { 0.5 };
    serde_json::json!({
        "audits": {
            "image-alt": {
                "score": score,
                "title": "Image elements do not have [alt] attributes",
                "details": {
                    "items": [
                        {"node": {"selector": "img.logo", "snippet": "<img class=\"logo\">"}}
                    ]
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn simulated_outcome_is_always_ok() {
        let outcome = drive_simulated(ScannerId::Pa11y, "http://example.test/a").await;
        assert!(outcome.is_successful());
    }

    #[test]
    fn same_url_produces_identical_raw_output() {
        let a = simulated_pa11y("http://example.test/a");
        let b = simulated_pa11y("http://example.test/a");
        assert_eq!(a, b);
    }
}
