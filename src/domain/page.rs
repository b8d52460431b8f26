//! `DiscoveredPage` and `PageSelection` (spec §3, §4.1, §4.2).

use serde::{Deserialize, Serialize};

/// Inferred classification of a discovered page (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    Homepage,
    Form,
    Article,
    Product,
    Listing,
    Contact,
    Legal,
    Manual,
    Other,
}

/// Counts of interactive/media elements on a page, used by priority
/// scoring (spec §4.1) and by the normalizer's confidence accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementCounts {
    pub forms: u32,
    pub inputs: u32,
    pub images: u32,
    pub links: u32,
}

/// One page reached during crawling (spec §3).
///
/// `url` is always canonicalized on construction: scheme and host
/// lowercased, default port stripped, fragment removed (spec §3
/// invariant). Use [`DiscoveredPage::new`] rather than constructing the
/// struct literal directly so this invariant can't be skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredPage {
    pub url: String,
    pub title: Option<String>,
    pub page_type: PageType,
    pub priority: u8,
    pub element_counts: ElementCounts,
    pub depth: u32,
    /// `true` when the fetch failed and the page was recorded but not
    /// expanded (spec §4.1: "discovered-but-unreachable").
    pub unreachable: bool,
}

impl DiscoveredPage {
    #[must_use]
    pub fn new(
        raw_url: &str,
        title: Option<String>,
        page_type: PageType,
        priority: u8,
        element_counts: ElementCounts,
        depth: u32,
        unreachable: bool,
    ) -> Option<Self> {
        let url = crate::crawler::canonicalize_url(raw_url)?;
        Some(Self {
            url,
            title,
            page_type,
            priority: priority.min(100),
            element_counts,
            depth,
            unreachable,
        })
    }
}

/// An ordered, deduplicated set of URLs to scan (spec §3).
///
/// Always non-empty when constructed from non-empty discovery input — the
/// selector (§4.2) is total and never produces an empty selection for
/// non-empty input, so this type carries no explicit emptiness check
/// beyond what `Vec` already gives; callers that need the spec's
/// non-empty guarantee enforced should go through [`crate::selector::select`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSelection {
    pub urls: Vec<String>,
}

impl PageSelection {
    #[must_use]
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// A selection is *representative* (spec §3) iff it contains the
    /// homepage (when one exists in `discovered`) and at least one URL
    /// per distinct page-type present in `discovered`, subject to the cap
    /// that produced it. This is a post-hoc check used by tests, not a
    /// construction path — the selector enforces the property by
    /// algorithm, not by checking it afterward.
    #[must_use]
    pub fn covers_all_page_types(&self, discovered: &[DiscoveredPage]) -> bool {
        use std::collections::HashSet;
        let selected: HashSet<&str> = self.urls.iter().map(String::as_str).collect();
        let present_types: HashSet<PageType> = discovered.iter().map(|p| p.page_type).collect();
        present_types.into_iter().all(|pt| {
            discovered
                .iter()
                .filter(|p| p.page_type == pt)
                .any(|p| selected.contains(p.url.as_str()))
        })
    }
}
