//! Event Bus (C6) and Stream Endpoint Adapter (C8) — spec §4.6.

mod bus;
mod config;
mod metrics;
mod sse;
mod topic;

pub use bus::{EventBus, Subscription};
pub use config::EventBusConfig;
pub use metrics::MetricsSnapshot;
pub use sse::{frame_event, sse_stream};
