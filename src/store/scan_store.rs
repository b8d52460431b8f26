//! `ScanSession` registry (C7, spec §4.7), grounded in the teacher's
//! `mcp::registry::CrawlRegistry` (keyed map of `Arc<Mutex<...>>>`
//! entries) generalized from a `(connection, crawl_id)` composite key to
//! a plain scan id.

use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::request::ScanRequest;
use crate::domain::result::AggregatedResult;
use crate::domain::session::{ScanSession, SessionState};

/// Versions kept per scan before oldest-first eviction (spec §4.7).
pub const MAX_VERSIONS: usize = 10;

#[derive(Clone, Default)]
pub struct ScanStore {
    sessions: Arc<DashMap<Uuid, Arc<Mutex<ScanSession>>>>,
}

impl ScanStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create and register a new session, returning the shared handle the
    /// owning worker task will mutate through for the session's lifetime.
    pub fn create(&self, scan_id: Uuid, request: ScanRequest) -> Arc<Mutex<ScanSession>> {
        let session = Arc::new(Mutex::new(ScanSession::new(scan_id, request, Utc::now())));
        self.sessions.insert(scan_id, session.clone());
        session
    }

    #[must_use]
    pub fn get(&self, scan_id: Uuid) -> Option<Arc<Mutex<ScanSession>>> {
        self.sessions.get(&scan_id).map(|e| e.clone())
    }

    /// A point-in-time snapshot for read-only callers (spec §4.7:
    /// "Reads may be concurrent and return a point-in-time snapshot").
    pub async fn snapshot(&self, scan_id: Uuid) -> Option<ScanSession> {
        let session = self.get(scan_id)?;
        let guard = session.lock().await;
        Some(guard.clone())
    }

    #[must_use]
    pub fn list_active(&self) -> Vec<Uuid> {
        self.sessions
            .iter()
            .filter_map(|e| {
                let state = e.value().try_lock().ok()?.state;
                (!state.is_terminal()).then(|| *e.key())
            })
            .collect()
    }

    /// Append a new result version, capped at [`MAX_VERSIONS`] with
    /// oldest-first eviction (spec §4.7).
    pub async fn append_version(&self, scan_id: Uuid, result: AggregatedResult) {
        let Some(session) = self.get(scan_id) else { return };
        let mut guard = session.lock().await;
        guard.versions.push(result);
        while guard.versions.len() > MAX_VERSIONS {
            guard.versions.remove(0);
        }
    }

    pub fn remove(&self, scan_id: Uuid) -> Option<Arc<Mutex<ScanSession>>> {
        self.sessions.remove(&scan_id).map(|(_, v)| v)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// All (scan_id, session-clone) pairs, used by the TTL sweep (spec
    /// §4.7). Cloning the session under lock keeps the sweep's hold on
    /// any one session brief.
    pub async fn snapshot_all(&self) -> Vec<(Uuid, ScanSession)> {
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
    use crate::domain::request::{Requester, SelectionPolicy};

    fn request() -> ScanRequest {
        ScanRequest {
            seed_url: "http://x".into(),
            requester: Requester { company: "c".into(), email: "a@b.co".into() },
            enabled_scanners: Default::default(),
            wave_credential: None,
            selection_policy: SelectionPolicy::default_representative(),
            max_pages: 1,
            max_depth: 1,
            simulate: true,
        }
    }

    #[tokio::test]
    async fn create_then_snapshot_round_trips() {
        let store = ScanStore::new();
        let id = Uuid::new_v4();
        store.create(id, request());
        let snapshot = store.snapshot(id).await.unwrap();
        assert_eq!(snapshot.scan_id, id);
        assert_eq!(snapshot.state, SessionState::Pending);
    }

    #[tokio::test]
    async fn version_list_evicts_oldest_beyond_cap() {
        let store = ScanStore::new();
        let id = Uuid::new_v4();
        store.create(id, request());
        for i in 0..15 {
            let result = AggregatedResult {
                scan_id: id,
                generated_at: Utc::now(),
                findings: vec![],
                outcome_summary: Default::default(),
                severity_totals: Default::default(),
                pour_totals: Default::default(),
                score: f64::from(i),
                compliance_level: crate::domain::result::ComplianceLevel::Compliant,
                confidence: 100,
                executive_summary: None,
            };
            store.append_version(id, result).await;
        }
        let snapshot = store.snapshot(id).await.unwrap();
        assert_eq!(snapshot.versions.len(), MAX_VERSIONS);
        assert_eq!(snapshot.versions.first().unwrap().score, 5.0);
    }
}
