//! Breadth-first page discovery (spec §4.1).
//!
//! This is the core discovery algorithm only: it knows nothing about
//! sessions or the event bus. Callers (the standalone discovery
//! endpoint's worker, or the orchestrator's DISCOVERING stage) drive this
//! and translate each freshly-discovered page into a `DISCOVERY_PROGRESS`
//! event and a `DiscoverySession`/`ScanSession` mutation — the same
//! separation the teacher keeps between `crawl_engine::crawler` (pure
//! traversal) and `orchestrator.rs` (session + event wiring).

use scraper::{Html, Selector};
use std::collections::{HashSet, VecDeque};
use std::time::Duration;
use url::Url;

use crate::crawler::canonical::{canonicalize_url, same_registered_domain};
use crate::crawler::page_type::{compute_priority, infer_page_type};
use crate::domain::page::{DiscoveredPage, ElementCounts};

/// Hard ceiling applied on top of the caller's bounds (spec §4.1:
/// "Hard caps: max_pages = 20 and max_depth = 2 ... whichever is
/// smaller wins").
pub const HARD_MAX_PAGES: u32 = 20;
pub const HARD_MAX_DEPTH: u32 = 2;

/// Per-URL fetch timeout (spec §4.1, §5).
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(3);

struct QueueItem {
    url: Url,
    depth: u32,
}

/// Run BFS discovery from `seed_url`, calling `on_page` once per page
/// (reached or recorded-as-unreachable) as it's produced. Returns the
/// full set of `DiscoveredPage`s once the queue drains or the effective
/// `max_pages` bound is hit.
pub async fn discover_pages(
    seed_url: &str,
    caller_max_pages: u32,
    caller_max_depth: u32,
    client: &reqwest::Client,
    mut on_page: impl FnMut(&DiscoveredPage),
) -> Vec<DiscoveredPage> {
    let max_pages = caller_max_pages.min(HARD_MAX_PAGES);
    let max_depth = caller_max_depth.min(HARD_MAX_DEPTH);

    let mut pages = Vec::new();
    let Some(seed) = Url::parse(seed_url).ok() else {
        return pages;
    };

    let mut visited: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<QueueItem> = VecDeque::new();
    queue.push_back(QueueItem { url: seed, depth: 0 });

    while let Some(item) = queue.pop_front() {
        if pages.len() as u32 >= max_pages {
            break;
        }

        // Fragment-only URLs are deduplicated before fetch (spec §4.1).
        let mut dedup_url = item.url.clone();
        dedup_url.set_fragment(None);
        let dedup_key = dedup_url.to_string();
        if !visited.insert(dedup_key) {
            continue;
        }

        let Some(canonical) = canonicalize_url(item.url.as_str()) else {
            continue;
        };

        match fetch_one(client, &canonical).await {
            Ok(fetched) => {
                let page_type = infer_page_type(item.url.path(), fetched.title.as_deref(), item.depth);
                let has_form = fetched.counts.forms > 0;
                let priority = compute_priority(page_type, has_form, item.depth, fetched.counts);

                let Some(page) = DiscoveredPage::new(
                    &canonical,
                    fetched.title,
                    page_type,
                    priority,
                    fetched.counts,
                    item.depth,
                    false,
                ) else {
                    continue;
                };

                on_page(&page);
                pages.push(page);

                if item.depth < max_depth {
                    for link in fetched.links {
                        if same_registered_domain(&item.url, &link) {
                            queue.push_back(QueueItem { url: link, depth: item.depth + 1 });
                        }
                    }
                }
            }
            Err(_) => {
                if let Some(page) =
                    DiscoveredPage::new(&canonical, None, crate::domain::page::PageType::Other, 0, ElementCounts::default(), item.depth, true)
                {
                    on_page(&page);
                    pages.push(page);
                }
            }
        }
    }

    pages
}

struct FetchedPage {
    title: Option<String>,
    counts: ElementCounts,
    links: Vec<Url>,
}

async fn fetch_one(client: &reqwest::Client, url: &str) -> Result<FetchedPage, reqwest::Error> {
    let response = client
        .get(url)
        .timeout(FETCH_TIMEOUT)
        .send()
        .await?
        .error_for_status()?;
    let body = response.text().await?;
    Ok(parse_page(url, &body))
}

fn parse_page(base_url: &str, body: &str) -> FetchedPage {
    let document = Html::parse_document(body);
    let base = Url::parse(base_url).ok();

    let title_selector = Selector::parse("title").expect("static selector");
    let title = document
        .select(&title_selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty());

    let form_selector = Selector::parse("form").expect("static selector");
    let input_selector = Selector::parse("input, select, textarea").expect("static selector");
    let img_selector = Selector::parse("img").expect("static selector");
    let a_selector = Selector::parse("a[href]").expect("static selector");

    let counts = ElementCounts {
        forms: document.select(&form_selector).count() as u32,
        inputs: document.select(&input_selector).count() as u32,
        images: document.select(&img_selector).count() as u32,
        links: document.select(&a_selector).count() as u32,
    };

    let links = document
        .select(&a_selector)
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| match &base {
            Some(base) => base.join(href).ok(),
            None => Url::parse(href).ok(),
        })
        .collect();

    FetchedPage { title, counts, links }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_title_and_element_counts() {
        let html = r#"<html><head><title>Hi There</title></head>
            <body><form><input></form><img src="a.png"><a href="/b">b</a></body></html>"#;
        let parsed = parse_page("http://example.test/", html);
        assert_eq!(parsed.title.as_deref(), Some("Hi There"));
        assert_eq!(parsed.counts.forms, 1);
        assert_eq!(parsed.counts.inputs, 1);
        assert_eq!(parsed.counts.images, 1);
        assert_eq!(parsed.links.len(), 1);
    }

    #[test]
    fn relative_links_are_resolved_against_base() {
        let html = r#"<a href="/sub/page">x</a>"#;
        let parsed = parse_page("http://example.test/dir/", html);
        assert_eq!(parsed.links[0].as_str(), "http://example.test/sub/page");
    }
}
