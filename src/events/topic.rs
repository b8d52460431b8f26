//! A single scan's event topic (spec §4.6): monotonic sequence counter,
//! bounded ring buffer, subscriber set.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

use crate::domain::event::ScanEvent;

/// One subscriber's outbound channel plus its own drop counter (spec
/// §4.6: "increments a per-subscriber drop counter"; §5: "two
/// subscribers ... may observe different drop sets").
pub struct Subscriber {
    pub id: u64,
    pub sender: mpsc::Sender<ScanEvent>,
    pub dropped: AtomicU64,
}

/// Per-scan-id topic (spec §4.6).
pub struct Topic {
    seq: AtomicU64,
    ring: Mutex<VecDeque<ScanEvent>>,
    ring_capacity: usize,
    subscribers: Mutex<Vec<Subscriber>>,
    next_subscriber_id: AtomicU64,
    terminal_emitted: Mutex<bool>,
}

impl Topic {
    #[must_use]
    pub fn new(ring_capacity: usize) -> Self {
        Self {
            seq: AtomicU64::new(0),
            ring: Mutex::new(VecDeque::with_capacity(ring_capacity)),
            ring_capacity,
            subscribers: Mutex::new(Vec::new()),
            next_subscriber_id: AtomicU64::new(1),
            terminal_emitted: Mutex::new(false),
        }
    }

    /// Assign the next sequence number (spec §4.6: "assign seq = ++counter").
    pub fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    #[must_use]
    pub fn current_seq(&self) -> u64 {
        self.seq.load(Ordering::SeqCst)
    }

    /// Append a stored (non-heartbeat) event to the ring buffer,
    /// evicting the oldest entry once at capacity.
    pub fn push_ring(&self, event: ScanEvent) {
        if event.event_type.is_terminal() {
            *self.terminal_emitted.lock() = true;
        }
        let mut ring = self.ring.lock();
        if ring.len() >= self.ring_capacity {
            ring.pop_front();
        }
        ring.push_back(event);
    }

    #[must_use]
    pub fn replay(&self) -> Vec<ScanEvent> {
        self.ring.lock().iter().cloned().collect()
    }

    #[must_use]
    pub fn has_emitted_terminal(&self) -> bool {
        *self.terminal_emitted.lock()
    }

    /// Register a new subscriber channel; returns its id for later
    /// unsubscribe.
    pub fn add_subscriber(&self, sender: mpsc::Sender<ScanEvent>) -> u64 {
        let id = self.next_subscriber_id.fetch_add(1, Ordering::SeqCst);
        self.subscribers.lock().push(Subscriber { id, sender, dropped: AtomicU64::new(0) });
        id
    }

    pub fn remove_subscriber(&self, id: u64) {
        self.subscribers.lock().retain(|s| s.id != id);
    }

    #[must_use]
    pub fn has_subscribers(&self) -> bool {
        !self.subscribers.lock().is_empty()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Non-blocking fan-out (spec §4.6: "deliver to each subscriber
    /// non-blockingly ... the publisher never blocks"). Returns
    /// (delivered, dropped) counts for metrics.
    pub fn deliver(&self, event: &ScanEvent) -> (u32, u32) {
        let subscribers = self.subscribers.lock();
        let mut delivered = 0;
        let mut dropped = 0;
        for subscriber in subscribers.iter() {
            match subscriber.sender.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    subscriber.dropped.fetch_add(1, Ordering::Relaxed);
                    dropped += 1;
                }
            }
        }
        (delivered, dropped)
    }

    #[must_use]
    pub fn drop_counts(&self) -> Vec<(u64, u64)> {
        self.subscribers
            .lock()
            .iter()
            .map(|s| (s.id, s.dropped.load(Ordering::Relaxed)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::{ScanEventPayload, ScanEventType};
    use chrono::Utc;
    use uuid::Uuid;

    fn event(seq: u64) -> ScanEvent {
        ScanEvent {
            scan_id: Uuid::nil(),
            seq,
            event_type: ScanEventType::DiscoveryProgress,
            timestamp: Utc::now(),
            payload: ScanEventPayload::DiscoveryProgress { pages_discovered: 1, max_pages: 10 },
        }
    }

    #[test]
    fn ring_buffer_evicts_oldest_beyond_capacity() {
        let topic = Topic::new(2);
        topic.push_ring(event(1));
        topic.push_ring(event(2));
        topic.push_ring(event(3));
        let replay: Vec<u64> = topic.replay().iter().map(|e| e.seq).collect();
        assert_eq!(replay, vec![2, 3]);
    }

    #[test]
    fn seq_counter_is_monotonic() {
        let topic = Topic::new(10);
        assert_eq!(topic.next_seq(), 1);
        assert_eq!(topic.next_seq(), 2);
        assert_eq!(topic.current_seq(), 2);
    }

    #[tokio::test]
    async fn full_subscriber_channel_increments_drop_counter_without_blocking() {
        let topic = Topic::new(10);
        let (tx, _rx) = tokio::sync::mpsc::channel(1);
        let id = topic.add_subscriber(tx);
        let (d1, dr1) = topic.deliver(&event(1));
        assert_eq!((d1, dr1), (1, 0));
        let (d2, dr2) = topic.deliver(&event(2));
        assert_eq!((d2, dr2), (0, 1));
        let drops = topic.drop_counts();
        assert_eq!(drops, vec![(id, 1)]);
    }
}
