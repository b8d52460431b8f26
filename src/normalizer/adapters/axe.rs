//! AXE raw output adapter: `{"violations": [{id, impact, description,
//! nodes: [{target, html, failureSummary}]}]}`.

use serde_json::Value;

use crate::normalizer::pre_finding::PreFinding;

#[must_use]
pub fn parse(page_url: &str, raw: &Value) -> Vec<PreFinding> {
    let mut pre_findings = Vec::new();

    let Some(violations) = raw.get("violations").and_then(Value::as_array) else {
        return pre_findings;
    };

    for violation in violations {
        let Some(rule_id) = violation.get("id").and_then(Value::as_str) else {
            continue;
        };
        let raw_severity = violation.get("impact").and_then(Value::as_str).unwrap_or("moderate").to_string();
        let description = violation
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or(rule_id)
            .to_string();

        let nodes = violation.get("nodes").and_then(Value::as_array).cloned().unwrap_or_default();
        if nodes.is_empty() {
            pre_findings.push(PreFinding {
                rule_code: rule_id.to_string(),
                raw_severity: raw_severity.clone(),
                element_selector: None,
                context: None,
                message: description.clone(),
                page_url: page_url.to_string(),
            });
            continue;
        }

        for node in nodes {
            let selector = node
                .get("target")
                .and_then(Value::as_array)
                .and_then(|t| t.first())
                .and_then(Value::as_str)
                .map(str::to_string);
            pre_findings.push(PreFinding {
                rule_code: rule_id.to_string(),
                raw_severity: raw_severity.clone(),
                element_selector: selector,
                context: node.get("html").and_then(Value::as_str).map(str::to_string),
                message: description.clone(),
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
    fn extracts_one_prefinding_per_node() {
        let raw = serde_json::json!({
            "violations": [{
                "id": "image-alt", "impact": "critical", "description": "d",
                "nodes": [{"target": ["img.a"], "html": "<img>"}, {"target": ["img.b"], "html": "<img>"}]
            }]
        });
        assert_eq!(parse("http://x", &raw).len(), 2);
    }

    #[test]
    fn violation_without_nodes_still_yields_one_prefinding() {
        let raw = serde_json::json!({"violations": [{"id": "x", "description": "d", "nodes": []}]});
        assert_eq!(parse("http://x", &raw).len(), 1);
    }
}
