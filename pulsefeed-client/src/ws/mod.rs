//! Reconnecting WebSocket feed client.
//!
//! One [`FeedSocket`] owns a single logical connection to one feed
//! endpoint and keeps it alive indefinitely while enabled: connect
//! attempts are throttled, failures retried with capped exponential
//! backoff and jitter, and silent hangs detected by a liveness check.
//! Decoded frames and connection-status changes fan out to an explicit
//! observer registry.

mod client;
mod config;
mod frame;
mod state;

pub use client::{ChannelSubscriber, FeedSocket, FeedSubscriber, SubscriptionId};
pub use config::{SocketConfig, SocketConfigBuilder};
pub use frame::{FeedFrame, FeedKind};
pub use state::ConnectionState;
