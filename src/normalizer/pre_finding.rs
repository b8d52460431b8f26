//! The common shape every scanner adapter produces before rule-table
//! lookup (spec §4.5 step 1: "A pre-finding carries {rule-code, raw
//! severity, element selector, context, message, page URL}").

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreFinding {
    pub rule_code: String,
    pub raw_severity: String,
    pub element_selector: Option<String>,
    pub context: Option<String>,
    pub message: String,
    pub page_url: String,
}
