//! WAVE raw output adapter (spec §6: `categories` map of error/alert/...
//! groups, each with named `items`).

use serde_json::Value;

use crate::normalizer::pre_finding::PreFinding;

#[must_use]
pub fn parse(page_url: &str, raw: &Value) -> Vec<PreFinding> {
    let mut pre_findings = Vec::new();

    let Some(categories) = raw.get("categories").and_then(Value::as_object) else {
        return pre_findings;
    };

    for (category_name, category) in categories {
        let Some(items) = category.get("items").and_then(Value::as_object) else {
            continue;
        };
        for (rule_code, item) in items {
            let count = item.get("count").and_then(Value::as_u64).unwrap_or(1).max(1);
            let description = item
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or(rule_code)
                .to_string();
            let selectors: Vec<String> = item
                .get("selectors")
                .and_then(Value::as_array)
                .map(|arr| arr.iter().filter_map(Value::as_str).map(str::to_string).collect())
                .unwrap_or_default();

            for i in 0..count {
                let selector = selectors.get(i as usize).or_else(|| selectors.first()).cloned();
                pre_findings.push(PreFinding {
                    rule_code: rule_code.clone(),
                    raw_severity: category_name.clone(),
                    element_selector: selector,
                    context: None,
                    message: description.clone(),
                    page_url: page_url.to_string(),
                });
            }
        }
    }

    pre_findings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_one_prefinding_per_counted_occurrence() {
        let raw = serde_json::json!({
            "categories": {
                "error": {
                    "count": 2,
                    "items": {
                        "alt_missing": {"count": 2, "description": "Missing alt", "selectors": ["img.a", "img.b"]}
                    }
                }
            }
        });
        let found = parse("http://x", &raw);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].rule_code, "alt_missing");
    }

    #[test]
    fn malformed_output_yields_no_prefindings() {
        let raw = serde_json::json!({"unexpected": true});
        assert!(parse("http://x", &raw).is_empty());
    }
}
