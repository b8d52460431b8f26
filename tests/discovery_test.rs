//! Standalone discovery endpoint + boundary behaviors from spec §8.

use a11y_scan_orchestrator::domain::SessionState;
use a11y_scan_orchestrator::error::FailureKind;
use a11y_scan_orchestrator::events::EventBus;
use a11y_scan_orchestrator::store::DiscoveryStore;
use a11y_scan_orchestrator::DiscoveryService;

/// Boundary behavior: "Crawler with max_pages=0 returns an empty
/// discovery" -> the standalone endpoint surfaces this as
/// FAILED/DISCOVERY_EMPTY, same as the orchestrator's DISCOVERING stage.
#[tokio::test]
async fn max_pages_zero_yields_discovery_empty() {
    let service = DiscoveryService::new(DiscoveryStore::new(), EventBus::new());
    let discovery_id = service.discover("http://example.test", 0, 1);

    loop {
        let session = service.poll(discovery_id).await.unwrap();
        if session.state.is_terminal() {
            assert_eq!(session.state, SessionState::Failed);
            assert_eq!(session.failure_kind, Some(FailureKind::DiscoveryEmpty));
            assert!(session.pages.is_empty());
            break;
        }
        tokio::task::yield_now().await;
    }
}

/// An unparseable seed URL can never be fetched, so discovery also ends
/// empty -> same DISCOVERY_EMPTY terminal kind.
#[tokio::test]
async fn unparseable_seed_url_yields_discovery_empty() {
    let service = DiscoveryService::new(DiscoveryStore::new(), EventBus::new());
    let discovery_id = service.discover("not-a-url-at-all", 10, 2);

    loop {
        let session = service.poll(discovery_id).await.unwrap();
        if session.state.is_terminal() {
            assert_eq!(session.state, SessionState::Failed);
            assert_eq!(session.failure_kind, Some(FailureKind::DiscoveryEmpty));
            break;
        }
        tokio::task::yield_now().await;
    }
}
