//! Page-type inference and priority scoring (spec §4.1: "pattern match
//! over URL path and HTML title"; "priority is a weighted sum").

use crate::domain::page::{ElementCounts, PageType};

/// Infer a page's type from its URL path and title. Order matters: more
/// specific categories are checked before the generic `Other` fallback.
#[must_use]
pub fn infer_page_type(path: &str, title: Option<&str>, depth: u32) -> PageType {
    let path = path.to_lowercase();
    let title = title.map(str::to_lowercase).unwrap_or_default();

    if depth == 0 || path == "/" || path.is_empty() {
        return PageType::Homepage;
    }
    if path.contains("/contact") || title.contains("contact") {
        return PageType::Contact;
    }
    if path.contains("/legal")
        || path.contains("/privacy")
        || path.contains("/terms")
        || title.contains("privacy policy")
        || title.contains("terms of service")
    {
        return PageType::Legal;
    }
    if path.contains("/product") || path.contains("/shop") || path.contains("/item") {
        return PageType::Product;
    }
    if path.contains("/category")
        || path.contains("/listing")
        || path.contains("/search")
        || path.contains("/catalog")
    {
        return PageType::Listing;
    }
    if path.contains("/form") || path.contains("/signup") || path.contains("/register") || path.contains("/apply") {
        return PageType::Form;
    }
    if path.contains("/blog") || path.contains("/article") || path.contains("/news") || path.contains("/post") {
        return PageType::Article;
    }

    PageType::Other
}

/// Weighted priority score in `[0, 100]` (spec §4.1): homepage and
/// form-bearing pages rank highest, with diminishing weight for depth
/// and a modest bonus for element-rich pages.
#[must_use]
pub fn compute_priority(page_type: PageType, has_form: bool, depth: u32, counts: ElementCounts) -> u8 {
    let mut score: f64 = match page_type {
        PageType::Homepage => 100.0,
        PageType::Form | PageType::Contact => 80.0,
        PageType::Product => 65.0,
        PageType::Article => 55.0,
        PageType::Listing => 50.0,
        PageType::Legal => 30.0,
        PageType::Manual => 70.0,
        PageType::Other => 40.0,
    };

    if has_form && page_type != PageType::Form {
        score += 15.0;
    }

    score -= f64::from(depth) * 8.0;

    let richness = f64::from(counts.forms * 4 + counts.inputs * 2 + counts.images + counts.links) / 10.0;
    score += richness.min(10.0);

    score.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_path_is_homepage_regardless_of_depth() {
        assert_eq!(infer_page_type("/", None, 0), PageType::Homepage);
    }

    #[test]
    fn contact_path_is_detected() {
        assert_eq!(infer_page_type("/contact-us", None, 1), PageType::Contact);
    }

    #[test]
    fn unmatched_path_falls_back_to_other() {
        assert_eq!(infer_page_type("/xyzzy123", Some("random page"), 2), PageType::Other);
    }

    #[test]
    fn homepage_outranks_deep_pages() {
        let homepage = compute_priority(PageType::Homepage, false, 0, ElementCounts::default());
        let deep = compute_priority(PageType::Other, false, 3, ElementCounts::default());
        assert!(homepage > deep);
    }

    #[test]
    fn priority_never_exceeds_cap() {
        let counts = ElementCounts { forms: 100, inputs: 100, images: 100, links: 100 };
        assert!(compute_priority(PageType::Homepage, true, 0, counts) <= 100);
    }
}
