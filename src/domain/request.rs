//! `ScanRequest` — the sole input to a scan (spec §3).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::ValidationError;

/// One of the four supported accessibility scanners (spec §4.3). Canonical
/// form is uppercase, per the open question in spec §9: the legacy source
/// mixed `"axe"`/`"axe-core"`/`"Axe-core"` spellings; we fix one spelling
/// and require adapters to normalize into it at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Scanner {
    Wave,
    Pa11y,
    Axe,
    Lighthouse,
}

impl Scanner {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Wave => "WAVE",
            Self::Pa11y => "PA11Y",
            Self::Axe => "AXE",
            Self::Lighthouse => "LIGHTHOUSE",
        }
    }
}

impl std::fmt::Display for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// How the caller wants the page set chosen (spec §4.2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Crawl then apply the WCAG-EM-style representative algorithm.
    Representative { cap: u32 },
    /// Caller supplies the exact URL list; still canonicalized and deduped.
    ExplicitList { urls: Vec<String> },
    /// Passthrough of the whole discovery set, capped.
    All { cap: u32 },
}

impl SelectionPolicy {
    #[must_use]
    pub fn default_representative() -> Self {
        Self::Representative { cap: 15 }
    }
}

/// The requester's identity, carried through to the report (spec §3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub company: String,
    pub email: String,
}

/// Input to a scan. Immutable once accepted (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanRequest {
    pub seed_url: String,
    pub requester: Requester,
    pub enabled_scanners: BTreeSet<Scanner>,
    pub wave_credential: Option<String>,
    pub selection_policy: SelectionPolicy,
    pub max_pages: u32,
    pub max_depth: u32,
    pub simulate: bool,
}

impl ScanRequest {
    /// Synchronous submission-time validation (spec §6, §7 `VALIDATION`).
    /// Runs before any session is created, so failures never produce a
    /// `ScanSession` — callers see a `ValidationError` directly.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let parsed = url::Url::parse(&self.seed_url)
            .map_err(|_| ValidationError::InvalidUrl(self.seed_url.clone()))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ValidationError::InvalidUrl(self.seed_url.clone()));
        }

        if !is_syntactically_valid_email(&self.requester.email) {
            return Err(ValidationError::InvalidEmail(self.requester.email.clone()));
        }

        if self.enabled_scanners.is_empty() {
            return Err(ValidationError::NoScannersEnabled);
        }

        if self.max_pages == 0 || self.max_pages > 50 {
            return Err(ValidationError::MaxPagesOutOfRange(self.max_pages));
        }

        if self.max_depth == 0 || self.max_depth > 3 {
            return Err(ValidationError::MaxDepthOutOfRange(self.max_depth));
        }

        if let SelectionPolicy::ExplicitList { urls } = &self.selection_policy {
            if urls.is_empty() {
                return Err(ValidationError::EmptyExplicitList);
            }
        }

        Ok(())
    }
}

/// A deliberately minimal syntactic check — one `@`, a non-empty local
/// part, and a domain part containing a dot. Real deliverability is an
/// external collaborator's concern (spec §1 non-goals: no email delivery).
fn is_syntactically_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}
