//! Standalone Discovery Endpoint (spec §4.1, §4.8: "Discovery endpoints
//! mirror the scan endpoints against DiscoverySession"). Lets a caller
//! run page discovery on its own, independent of a full scan — same
//! worker-per-session shape as [`crate::orchestrator::Orchestrator`], cut
//! down to the one stage.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::event::{ScanEventPayload, ScanEventType};
use crate::domain::session::{DiscoverySession, SessionState};
use crate::error::{DiscoveryError, OrchestratorError};
use crate::events::EventBus;
use crate::store::DiscoveryStore;

/// `discover(seed, max_pages, max_depth) -> DiscoverySessionId` plus
/// `poll(id) -> {state, progress, pages}` (spec §4.1).
#[derive(Clone)]
pub struct DiscoveryService {
    store: DiscoveryStore,
    events: EventBus,
    http_client: reqwest::Client,
}

impl DiscoveryService {
    #[must_use]
    pub fn new(store: DiscoveryStore, events: EventBus) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(crate::crawler::FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { store, events, http_client }
    }

    /// Start a discovery run and return its id immediately; the crawl
    /// itself runs on a dedicated worker task, same as a scan.
    pub fn discover(&self, seed_url: impl Into<String>, max_pages: u32, max_depth: u32) -> Uuid {
        let seed_url = seed_url.into();
        let discovery_id = Uuid::new_v4();
        let session = self.store.create(discovery_id, seed_url.clone(), max_pages, max_depth);

        let events = self.events.clone();
        let http_client = self.http_client.clone();

        tokio::spawn(async move {
            run_discovery(discovery_id, seed_url, max_pages, max_depth, session, events, http_client).await;
        });

        discovery_id
    }

    pub async fn poll(&self, discovery_id: Uuid) -> Result<DiscoverySession, OrchestratorError> {
        self.store.snapshot(discovery_id).await.ok_or(OrchestratorError::NotFound(discovery_id))
    }

    #[must_use]
    pub fn subscribe(&self, discovery_id: Uuid) -> crate::events::Subscription {
        self.events.subscribe(discovery_id)
    }
}

async fn run_discovery(
    discovery_id: Uuid,
    seed_url: String,
    max_pages: u32,
    max_depth: u32,
    session: Arc<Mutex<DiscoverySession>>,
    events: EventBus,
    http_client: reqwest::Client,
) {
    {
        let mut guard = session.lock().await;
        guard.state = SessionState::Discovering;
    }

    let mut discovered_count: u32 = 0;
    let pages = crate::crawler::discover_pages(&seed_url, max_pages, max_depth, &http_client, |_page| {
        discovered_count += 1;
        events.publish(
            discovery_id,
            ScanEventType::DiscoveryProgress,
            ScanEventPayload::DiscoveryProgress { pages_discovered: discovered_count, max_pages },
        );
    })
    .await;

    let mut guard = session.lock().await;
    guard.progress_percent = crate::orchestrator::progress::discovery_progress(pages.len() as u32, max_pages);

    if pages.is_empty() {
        guard.state = SessionState::Failed;
        guard.failure_kind = Some(crate::error::FailureKind::DiscoveryEmpty);
        guard.completed_at = Some(Utc::now());
        tracing::debug!(%discovery_id, error = %DiscoveryError::Empty, "discovery produced zero pages");
        return;
    }

    guard.pages = pages;
    guard.state = SessionState::Completed;
    guard.progress_percent = 100.0;
    guard.completed_at = Some(Utc::now());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn discovery_of_unreachable_seed_fails_with_discovery_empty() {
        let service = DiscoveryService::new(DiscoveryStore::new(), EventBus::new());
        let discovery_id = service.discover("not a url", 5, 1);

        loop {
            let session = service.poll(discovery_id).await.unwrap();
            if session.state.is_terminal() {
                assert_eq!(session.state, SessionState::Failed);
                assert_eq!(session.failure_kind, Some(crate::error::FailureKind::DiscoveryEmpty));
                break;
            }
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn poll_of_unknown_id_is_not_found() {
        let service = DiscoveryService::new(DiscoveryStore::new(), EventBus::new());
        let result = service.poll(Uuid::new_v4()).await;
        assert!(matches!(result, Err(OrchestratorError::NotFound(_))));
    }
}
