//! # Pulsefeed Client
//!
//! Connection-resilience and notification-ordering core for the
//! Pulsefeed earnings dashboard.
//!
//! This crate provides:
//! - Reconnecting WebSocket feed clients with backoff, liveness
//!   checking, and an explicit observer registry
//! - A reference-counted connection-sharing layer with a teardown
//!   grace window
//! - A message ledger merging live pushes into paginated snapshots
//!   idempotently, with deterministic ordering and highlight expiry
//! - An audio notification queue with strict one-at-a-time playback
//! - A polling fallback that reconciles missed live pushes
//!
//! # Architecture
//!
//! The crate is organized into:
//! - `ws` - reconnecting socket client infrastructure
//! - `share` - reference-counted connection sharing
//! - `merge` - message ledger and digest projection
//! - `audio` - audio notification queue
//! - `poll` - snapshot polling fallback
//! - `fetch` - REST collaborator traits
//!
//! # Example
//!
//! ```ignore
//! use pulsefeed_client::ws::{FeedKind, FeedSocket, SocketConfig};
//!
//! let config = SocketConfig::builder()
//!     .url("wss://feed.example.com/ws/messages")
//!     .feed("messages")
//!     .build();
//!
//! let socket = FeedSocket::new(config, FeedKind::Messages);
//! socket.enable();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

/// Reconnecting WebSocket client infrastructure
pub mod ws;

/// Reference-counted connection sharing
pub mod share;

/// Message merge engine
pub mod merge;

/// Audio notification queue
pub mod audio;

/// Snapshot polling fallback
pub mod poll;

/// REST collaborator traits
pub mod fetch;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::audio::{AudioQueue, AudioQueueConfig, AudioSink};
    pub use crate::fetch::{FetchQuery, MessageFetcher, MessagePage, WatchlistSource};
    pub use crate::merge::{MessageLedger, PushOutcome};
    pub use crate::poll::{PollerConfig, SnapshotPoller};
    pub use crate::share::SharedFeed;
    pub use crate::ws::{
        ChannelSubscriber, FeedFrame, FeedKind, FeedSocket, FeedSubscriber, SocketConfig,
        SocketConfigBuilder, SubscriptionId,
    };
}
