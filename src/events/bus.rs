//! `EventBus` — the per-scan-id topic registry (C6, spec §4.6).
//!
//! Grounded in the teacher's `CrawlEventBus` for its overall shape
//! (config + metrics + graceful shutdown, `Arc`-shared handle cloned into
//! every worker), but the transport is different: the teacher fans a
//! single `broadcast::Sender` out to all subscribers of one bus, where
//! this bus needs independent per-subscriber backpressure (drop-when-full
//! rather than lag-and-reread) and a bounded replay buffer per topic, so
//! it's built on a `DashMap<Uuid, Arc<Topic>>` of per-scan topics each
//! holding its own `mpsc` subscriber set rather than one shared
//! `broadcast` channel.

use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};
use uuid::Uuid;

use crate::domain::event::{ScanEvent, ScanEventPayload, ScanEventType};
use crate::events::config::EventBusConfig;
use crate::events::metrics::{EventBusMetrics, MetricsSnapshot};
use crate::events::topic::Topic;

/// Cleanup token for one subscription: removes the subscriber from its
/// topic and records the unsubscribe metric when dropped, however the
/// drop happens (explicit unsubscribe, the `Subscription` going out of
/// scope, or an SSE stream built from it being dropped mid-stream on
/// client disconnect).
struct SubscriptionGuard {
    topic: Arc<Topic>,
    subscriber_id: u64,
    bus: EventBus,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.topic.remove_subscriber(self.subscriber_id);
        self.bus.metrics.record_unsubscribe();
    }
}

/// Handle returned by [`EventBus::subscribe`]: the replayed history plus
/// a live channel for subsequent events (spec §4.6).
pub struct Subscription {
    pub replay: Vec<ScanEvent>,
    pub receiver: mpsc::Receiver<ScanEvent>,
    guard: SubscriptionGuard,
}

impl Subscription {
    /// Explicit unsubscribe (spec §4.6); equivalent to letting the
    /// `Subscription` drop, spelled out for callers that want to signal
    /// intent.
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Split into the raw receiver plus a standalone cleanup guard, for
    /// adapters (e.g. [`crate::events::sse::sse_stream`]) that need to
    /// hold the receiver across an async stream combinator that can't
    /// also hold `Subscription` itself.
    #[must_use]
    pub fn into_receiver_and_guard(self) -> (mpsc::Receiver<ScanEvent>, impl Send + 'static) {
        (self.receiver, self.guard)
    }
}

#[derive(Clone)]
pub struct EventBus {
    topics: Arc<DashMap<Uuid, Arc<Topic>>>,
    config: EventBusConfig,
    metrics: Arc<EventBusMetrics>,
    shutdown: Arc<AtomicBool>,
    shutdown_notify: Arc<Notify>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    #[must_use]
    pub fn with_config(config: EventBusConfig) -> Self {
        Self {
            topics: Arc::new(DashMap::new()),
            config,
            metrics: Arc::new(EventBusMetrics::default()),
            shutdown: Arc::new(AtomicBool::new(false)),
            shutdown_notify: Arc::new(Notify::new()),
        }
    }

    fn topic_for(&self, scan_id: Uuid) -> Arc<Topic> {
        self.topics
            .entry(scan_id)
            .or_insert_with(|| Arc::new(Topic::new(self.config.ring_buffer_capacity)))
            .clone()
    }

    /// Publish an event for `scan_id` (spec §4.6). Called by the
    /// orchestrator worker only (single publisher per topic). Returns the
    /// stamped event (with its assigned sequence number and timestamp).
    pub fn publish(&self, scan_id: Uuid, event_type: ScanEventType, payload: ScanEventPayload) -> ScanEvent {
        let topic = self.topic_for(scan_id);
        let seq = topic.next_seq();
        let event = ScanEvent { scan_id, seq, event_type, timestamp: Utc::now(), payload };

        topic.push_ring(event.clone());
        let (delivered, dropped) = topic.deliver(&event);
        self.metrics.record_published();
        for _ in 0..delivered {
            self.metrics.record_delivered();
        }
        for _ in 0..dropped {
            self.metrics.record_dropped();
        }

        event
    }

    /// Emit a heartbeat on `scan_id`'s topic if it has subscribers (spec
    /// §4.6). Heartbeats don't consume sequence numbers or enter the
    /// ring buffer.
    pub fn publish_heartbeat(&self, scan_id: Uuid) {
        let Some(topic) = self.topics.get(&scan_id) else { return };
        if !topic.has_subscribers() {
            return;
        }
        let event = ScanEvent::heartbeat(scan_id, Utc::now());
        topic.deliver(&event);
        self.metrics.record_heartbeat();
    }

    /// Drive heartbeats across every topic with active subscribers.
    /// Intended to be called from a single background task on an
    /// interval timer (spec §4.6: "30-second intervals").
    pub fn tick_heartbeats(&self) {
        let scan_ids: Vec<Uuid> = self.topics.iter().map(|entry| *entry.key()).collect();
        for scan_id in scan_ids {
            self.publish_heartbeat(scan_id);
        }
    }

    /// Subscribe to `scan_id`'s topic (spec §4.6): returns the replay of
    /// retained events, then a live channel. If a terminal event has
    /// already been emitted, the replay is returned and the channel is
    /// closed immediately (caller sees the replay, then the channel
    /// yields `None` on the first `recv`).
    #[must_use]
    pub fn subscribe(&self, scan_id: Uuid) -> Subscription {
        let topic = self.topic_for(scan_id);
        let replay = topic.replay();

        let (sender, receiver) = mpsc::channel(self.config.subscriber_channel_capacity);
        let subscriber_id = if topic.has_emitted_terminal() {
            // Register then immediately drop the sender so the receiver
            // observes a closed channel after replay, matching "subscribe
            // still yields the replay and then closes the channel
            // immediately" (spec §4.6).
            let id = topic.add_subscriber(sender);
            topic.remove_subscriber(id);
            id
        } else {
            topic.add_subscriber(sender)
        };

        self.metrics.record_subscribe();

        Subscription {
            replay,
            receiver,
            guard: SubscriptionGuard { topic, subscriber_id, bus: self.clone() },
        }
    }

    #[must_use]
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    #[must_use]
    pub fn subscriber_count(&self, scan_id: Uuid) -> usize {
        self.topics.get(&scan_id).map(|t| t.subscriber_count()).unwrap_or(0)
    }

    /// Drop a topic outright (used by the session store's TTL sweep once
    /// a scan session itself is evicted).
    pub fn remove_topic(&self, scan_id: Uuid) {
        self.topics.remove(&scan_id);
    }

    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Signal shutdown; background heartbeat tasks observing this flag
    /// should stop scheduling further ticks (teacher's
    /// `shutdown_gracefully` pattern).
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.shutdown_notify.notify_waiters();
    }

    pub async fn wait_for_shutdown(&self) {
        if self.is_shutdown() {
            return;
        }
        self.shutdown_notify.notified().await;
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribe_replays_then_streams_live_events() {
        let bus = EventBus::new();
        let scan_id = Uuid::new_v4();
        bus.publish(scan_id, ScanEventType::ScanStart, ScanEventPayload::ScanStart { seed_url: "http://x".into(), enabled_scanners: vec![] });

        let mut sub = bus.subscribe(scan_id);
        assert_eq!(sub.replay.len(), 1);

        bus.publish(scan_id, ScanEventType::AggregationStart, ScanEventPayload::AggregationStart { total_outcomes: 1 });
        let next = sub.receiver.recv().await.unwrap();
        assert_eq!(next.event_type, ScanEventType::AggregationStart);
    }

    #[tokio::test]
    async fn subscribe_after_terminal_event_closes_immediately() {
        let bus = EventBus::new();
        let scan_id = Uuid::new_v4();
        bus.publish(scan_id, ScanEventType::ScanFailed, ScanEventPayload::ScanFailed { failure_kind: crate::error::FailureKind::Internal, message: "x".into() });

        let mut sub = bus.subscribe(scan_id);
        assert_eq!(sub.replay.len(), 1);
        assert_eq!(sub.receiver.recv().await, None);
    }

    #[tokio::test]
    async fn heartbeats_do_not_consume_sequence_numbers() {
        let bus = EventBus::new();
        let scan_id = Uuid::new_v4();
        let _sub = bus.subscribe(scan_id);
        let e1 = bus.publish(scan_id, ScanEventType::ScanStart, ScanEventPayload::ScanStart { seed_url: "http://x".into(), enabled_scanners: vec![] });
        bus.publish_heartbeat(scan_id);
        let e2 = bus.publish(scan_id, ScanEventType::AggregationStart, ScanEventPayload::AggregationStart { total_outcomes: 0 });
        assert_eq!(e2.seq, e1.seq + 1);
    }
}
