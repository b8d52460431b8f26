//! Page Selector (C3, spec §4.2): a pure, total function from discovery
//! output to the subset of pages that will actually be scanned.

use std::collections::HashSet;

use crate::crawler::canonicalize_url;
use crate::domain::page::{DiscoveredPage, PageSelection, PageType};
use crate::domain::request::SelectionPolicy;

/// `select(discovered, policy) -> PageSelection` (spec §4.2). Always
/// returns a non-empty selection for non-empty `discovered`, except for
/// the explicit-list policy which passes through the caller's own list
/// (possibly empty, though submission-time validation rejects that case).
#[must_use]
pub fn select(discovered: &[DiscoveredPage], policy: &SelectionPolicy) -> PageSelection {
    match policy {
        SelectionPolicy::Representative { cap } => representative(discovered, *cap),
        SelectionPolicy::ExplicitList { urls } => explicit_list(urls),
        SelectionPolicy::All { cap } => all_capped(discovered, *cap),
    }
}

fn representative(discovered: &[DiscoveredPage], cap: u32) -> PageSelection {
    let cap = cap.max(1) as usize;
    let mut chosen: Vec<&DiscoveredPage> = Vec::new();
    let mut chosen_urls: HashSet<&str> = HashSet::new();

    // Step 1: homepage if present.
    if let Some(home) = discovered.iter().find(|p| p.page_type == PageType::Homepage) {
        chosen.push(home);
        chosen_urls.insert(home.url.as_str());
    }

    // Step 2: one highest-priority page per distinct page-type not yet
    // represented, in a stable type order.
    let all_types = [
        PageType::Homepage,
        PageType::Form,
        PageType::Contact,
        PageType::Product,
        PageType::Article,
        PageType::Listing,
        PageType::Legal,
        PageType::Manual,
        PageType::Other,
    ];
    for page_type in all_types {
        if chosen.len() >= cap {
            break;
        }
        let already_represented = chosen.iter().any(|p| p.page_type == page_type);
        if already_represented {
            continue;
        }
        let best = discovered
            .iter()
            .filter(|p| p.page_type == page_type && !chosen_urls.contains(p.url.as_str()))
            .max_by(|a, b| a.priority.cmp(&b.priority).then_with(|| b.url.cmp(&a.url)));
        if let Some(best) = best {
            chosen.push(best);
            chosen_urls.insert(best.url.as_str());
        }
    }

    // Step 3: fill remaining budget by descending priority, tie-break
    // lexicographic URL (step 4).
    let mut remaining: Vec<&DiscoveredPage> = discovered
        .iter()
        .filter(|p| !chosen_urls.contains(p.url.as_str()))
        .collect();
    remaining.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.url.cmp(&b.url)));

    for page in remaining {
        if chosen.len() >= cap {
            break;
        }
        chosen.push(page);
        chosen_urls.insert(page.url.as_str());
    }

    let mut urls: Vec<String> = chosen.into_iter().map(|p| p.url.clone()).collect();
    urls.sort();
    urls.dedup();
    PageSelection { urls }
}

fn explicit_list(urls: &[String]) -> PageSelection {
    let mut seen = HashSet::new();
    let mut canonical_urls = Vec::new();
    for raw in urls {
        if let Some(canonical) = canonicalize_url(raw) {
            if seen.insert(canonical.clone()) {
                canonical_urls.push(canonical);
            }
        }
    }
    PageSelection { urls: canonical_urls }
}

fn all_capped(discovered: &[DiscoveredPage], cap: u32) -> PageSelection {
    let cap = cap.max(1) as usize;
    let mut urls: Vec<String> = discovered.iter().map(|p| p.url.clone()).collect();
    urls.sort();
    urls.dedup();
    urls.truncate(cap);
    PageSelection { urls }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::page::ElementCounts;

    fn page(url: &str, page_type: PageType, priority: u8) -> DiscoveredPage {
        DiscoveredPage::new(url, None, page_type, priority, ElementCounts::default(), 0, false).unwrap()
    }

    #[test]
    fn representative_always_includes_homepage() {
        let discovered = vec![
            page("http://x.test/", PageType::Homepage, 100),
            page("http://x.test/about", PageType::Other, 40),
        ];
        let selection = select(&discovered, &SelectionPolicy::Representative { cap: 15 });
        assert!(selection.urls.contains(&"http://x.test/".to_string()));
    }

    #[test]
    fn representative_covers_all_page_types_under_cap() {
        let discovered = vec![
            page("http://x.test/", PageType::Homepage, 100),
            page("http://x.test/contact", PageType::Contact, 80),
            page("http://x.test/products/a", PageType::Product, 60),
        ];
        let selection = select(&discovered, &SelectionPolicy::Representative { cap: 15 });
        assert!(selection.covers_all_page_types(&discovered));
    }

    #[test]
    fn representative_respects_cap() {
        let discovered: Vec<_> = (0..30)
            .map(|i| page(&format!("http://x.test/p{i}"), PageType::Other, 10))
            .collect();
        let selection = select(&discovered, &SelectionPolicy::Representative { cap: 5 });
        assert_eq!(selection.len(), 5);
    }

    #[test]
    fn explicit_list_canonicalizes_and_dedups() {
        let urls = vec![
            "HTTP://X.TEST:80/a#frag".to_string(),
            "http://x.test/a".to_string(),
        ];
        let selection = select(&[], &SelectionPolicy::ExplicitList { urls });
        assert_eq!(selection.urls, vec!["http://x.test/a".to_string()]);
    }

    #[test]
    fn all_policy_is_capped_and_sorted() {
        let discovered = vec![page("http://x.test/b", PageType::Other, 1), page("http://x.test/a", PageType::Other, 1)];
        let selection = select(&discovered, &SelectionPolicy::All { cap: 10 });
        assert_eq!(selection.urls, vec!["http://x.test/a".to_string(), "http://x.test/b".to_string()]);
    }
}
