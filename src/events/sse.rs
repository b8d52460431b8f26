//! Stream Endpoint Adapter (C8, spec §4.6, §6): frames a subscription's
//! events as Server-Sent Events. This is the wire-format half only — the
//! actual long-lived HTTP response is an external collaborator's concern
//! (spec §1 non-goals); this module exposes a pure `Stream<Item = String>`
//! an HTTP layer can forward as the response body.

use futures::stream::{self, Stream, StreamExt};

use crate::domain::event::{ScanEvent, ScanEventType};
use crate::events::bus::Subscription;

/// Frame one event per spec §6: `data: {json}\n\n` for ordinary events,
/// `: heartbeat\n\n` (no JSON body) for heartbeats.
#[must_use]
pub fn frame_event(event: &ScanEvent) -> String {
    if event.event_type == ScanEventType::Heartbeat {
        return ": heartbeat\n\n".to_string();
    }
    match serde_json::to_string(event) {
        Ok(json) => format!("data: {json}\n\n"),
        Err(err) => {
            tracing::error!(%err, "failed to serialize scan event for sse frame");
            ": heartbeat\n\n".to_string()
        }
    }
}

/// Turn a [`Subscription`] into a framed SSE text stream: the replay
/// first (synchronously, spec §4.6), then live events as they arrive.
/// The stream ends when the channel closes — which happens exactly once
/// a terminal event has been delivered and the subscriber unsubscribes,
/// or immediately (after replay) if the topic was already terminal at
/// subscribe time.
pub fn sse_stream(subscription: Subscription) -> impl Stream<Item = String> {
    let replay_frames: Vec<String> = subscription.replay.iter().map(frame_event).collect();
    let (receiver, guard) = subscription.into_receiver_and_guard();

    let replay_stream = stream::iter(replay_frames);
    let live_stream = stream::unfold((receiver, guard), |(mut receiver, guard)| async move {
        let event = receiver.recv().await?;
        let frame = frame_event(&event);
        Some((frame, (receiver, guard)))
    });
    replay_stream.chain(live_stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::ScanEventPayload;
    use crate::events::bus::EventBus;
    use uuid::Uuid;

    #[test]
    fn heartbeat_frames_without_json_body() {
        let event = ScanEvent::heartbeat(Uuid::nil(), chrono::Utc::now());
        assert_eq!(frame_event(&event), ": heartbeat\n\n");
    }

    #[test]
    fn ordinary_event_frames_as_data_line() {
        let event = ScanEvent {
            scan_id: Uuid::nil(),
            seq: 1,
            event_type: ScanEventType::ScanStart,
            timestamp: chrono::Utc::now(),
            payload: ScanEventPayload::ScanStart { seed_url: "http://x".into(), enabled_scanners: vec![] },
        };
        let framed = frame_event(&event);
        assert!(framed.starts_with("data: "));
        assert!(framed.ends_with("\n\n"));
    }

    #[tokio::test]
    async fn stream_yields_replay_before_live_events() {
        let bus = EventBus::new();
        let scan_id = Uuid::new_v4();
        bus.publish(scan_id, ScanEventType::ScanStart, ScanEventPayload::ScanStart { seed_url: "http://x".into(), enabled_scanners: vec![] });
        let subscription = bus.subscribe(scan_id);
        let mut frames = Box::pin(sse_stream(subscription));
        let first = frames.next().await.unwrap();
        assert!(first.contains("SCAN_START"));
    }
}
