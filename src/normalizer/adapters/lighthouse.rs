//! LIGHTHOUSE raw output adapter: `{"audits": {rule_id: {score, title,
//! details: {items: [{node: {selector, snippet}}]}}}}`. An audit only
//! represents a finding when its score indicates a failure (`< 1`);
//! Lighthouse uses `null` score for informational/non-applicable audits.

use serde_json::Value;

use crate::normalizer::pre_finding::PreFinding;

#[must_use]
pub fn parse(page_url: &str, raw: &Value) -> Vec<PreFinding> {
    let mut pre_findings = Vec::new();

    let Some(audits) = raw.get("audits").and_then(Value::as_object) else {
        return pre_findings;
    };

    for (audit_id, audit) in audits {
        let Some(score) = audit.get("score").and_then(Value::as_f64) else {
            continue;
        };
        if score >= 1.0 {
            continue;
        }

        let title = audit.get("title").and_then(Value::as_str).unwrap_or(audit_id).to_string();
        let raw_severity = if score == 0.0 { "error" } else { "warning" }.to_string();

        let items = audit
            .get("details")
            .and_then(|d| d.get("items"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        if items.is_empty() {
            pre_findings.push(PreFinding {
                rule_code: audit_id.clone(),
                raw_severity: raw_severity.clone(),
                element_selector: None,
                context: None,
                message: title.clone(),
                page_url: page_url.to_string(),
            });
            continue;
        }

        for item in items {
            let node = item.get("node");
            pre_findings.push(PreFinding {
                rule_code: audit_id.clone(),
                raw_severity: raw_severity.clone(),
                element_selector: node.and_then(|n| n.get("selector")).and_then(Value::as_str).map(str::to_string),
                context: node.and_then(|n| n.get("snippet")).and_then(Value::as_str).map(str::to_string),
                message: title.clone(),
                page_url: page_url.to_string(),
            });
        }
    }

    pre_findings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failing_audit_with_items_yields_prefindings() {
        let raw = serde_json::json!({
            "audits": {
                "image-alt": {"score": 0, "title": "t", "details": {"items": [{"node": {"selector": "img", "snippet": "<img>"}}]}}
            }
        });
        assert_eq!(parse("http://x", &raw).len(), 1);
    }

    #[test]
    fn passing_audit_is_skipped() {
        let raw = serde_json::json!({"audits": {"image-alt": {"score": 1, "title": "t"}}});
        assert!(parse("http://x", &raw).is_empty());
    }

    #[test]
    fn non_applicable_audit_with_null_score_is_skipped() {
        let raw = serde_json::json!({"audits": {"image-alt": {"score": Value::Null, "title": "t"}}});
        assert!(parse("http://x", &raw).is_empty());
    }
}
