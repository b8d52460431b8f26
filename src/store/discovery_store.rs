//! `DiscoverySession` registry (C7, spec §4.7) — same shape as
//! [`crate::store::scan_store::ScanStore`], kept as a separate type since
//! the two session kinds have distinct fields and the spec treats them as
//! two keyed maps, not one.

use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::session::DiscoverySession;

#[derive(Clone, Default)]
pub struct DiscoveryStore {
    sessions: Arc<DashMap<Uuid, Arc<Mutex<DiscoverySession>>>>,
}

impl DiscoveryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, discovery_id: Uuid, seed_url: String, max_pages: u32, max_depth: u32) -> Arc<Mutex<DiscoverySession>> {
        let session = Arc::new(Mutex::new(DiscoverySession::new(discovery_id, seed_url, max_pages, max_depth, Utc::now())));
        self.sessions.insert(discovery_id, session.clone());
        session
    }

    #[must_use]
    pub fn get(&self, discovery_id: Uuid) -> Option<Arc<Mutex<DiscoverySession>>> {
        self.sessions.get(&discovery_id).map(|e| e.clone())
    }

    pub async fn snapshot(&self, discovery_id: Uuid) -> Option<DiscoverySession> {
        let session = self.get(discovery_id)?;
        let guard = session.lock().await;
        Some(guard.clone())
    }

    pub fn remove(&self, discovery_id: Uuid) -> Option<Arc<Mutex<DiscoverySession>>> {
        self.sessions.remove(&discovery_id).map(|(_, v)| v)
    }

    pub async fn snapshot_all(&self) -> Vec<(Uuid, DiscoverySession)> {
        let ids: Vec<Uuid> = self.sessions.iter().map(|e| *e.key()).collect();
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(session) = self.snapshot(id).await {
                out.push((id, session));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_snapshot_round_trips() {
        let store = DiscoveryStore::new();
        let id = Uuid::new_v4();
        store.create(id, "http://x".into(), 10, 2);
        let snapshot = store.snapshot(id).await.unwrap();
        assert_eq!(snapshot.discovery_id, id);
        assert_eq!(snapshot.seed_url, "http://x");
    }
}
