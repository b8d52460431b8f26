//! PA11Y raw output adapter: a JSON array of issue objects.

use serde_json::Value;

use crate::normalizer::pre_finding::PreFinding;

#[must_use]
pub fn parse(page_url: &str, raw: &Value) -> Vec<PreFinding> {
    let Some(issues) = raw.as_array() else {
        return Vec::new();
    };

    issues
        .iter()
        .filter_map(|issue| {
            let code = issue.get("code").and_then(Value::as_str)?;
            let message = issue.get("message").and_then(Value::as_str).unwrap_or(code);
            Some(PreFinding {
                rule_code: code.to_string(),
                raw_severity: issue.get("type").and_then(Value::as_str).unwrap_or("error").to_string(),
                element_selector: issue.get("selector").and_then(Value::as_str).map(str::to_string),
                context: issue.get("context").and_then(Value::as_str).map(str::to_string),
                message: message.to_string(),
                page_url: page_url.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_issues_from_array() {
        let raw = serde_json::json!([
            {"code": "X.1", "type": "error", "message": "m", "selector": "img", "context": "<img>"}
        ]);
        let found = parse("http://x", &raw);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].rule_code, "X.1");
    }

    #[test]
    fn non_array_output_yields_no_prefindings() {
        assert!(parse("http://x", &serde_json::json!({"not": "an array"})).is_empty());
    }
}
