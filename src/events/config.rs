//! Event bus configuration (spec §4.6), following the teacher's
//! `EventBusConfig` builder-of-constants shape.

use std::time::Duration;

/// Bounded ring buffer size per topic (spec §4.6: "last 100 events").
pub const RING_BUFFER_CAPACITY: usize = 100;

/// Heartbeat cadence on topics with active subscribers (spec §4.6).
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy)]
pub struct EventBusConfig {
    /// Ring buffer size per topic.
    pub ring_buffer_capacity: usize,
    /// Per-subscriber mpsc channel capacity; a full channel means the
    /// publish is dropped for that subscriber, never blocked on (spec
    /// §4.6: "the publisher never blocks").
    pub subscriber_channel_capacity: usize,
    pub heartbeat_interval: Duration,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            ring_buffer_capacity: RING_BUFFER_CAPACITY,
            subscriber_channel_capacity: 256,
            heartbeat_interval: HEARTBEAT_INTERVAL,
        }
    }
}
