//! Reference-counted feed sharing.
//!
//! Several views can consume the same feed at once; the transport must
//! come up when the first consumer arrives and go away only after the
//! last one leaves. [`SharedFeed`] wraps a [`FeedSocket`] with a
//! reference count and a grace window: when the count hits zero the
//! teardown is deferred, so a consumer re-acquiring within the window
//! (a route change, a tab re-render) reuses the live connection
//! instead of bouncing it.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::ws::FeedSocket;

/// Default teardown grace window.
pub const DEFAULT_GRACE: Duration = Duration::from_secs(2);

struct ShareState {
    refs: usize,
    teardown: Option<JoinHandle<()>>,
}

struct SharedFeedInner {
    socket: Arc<FeedSocket>,
    grace: Duration,
    state: Mutex<ShareState>,
}

/// Reference-counted handle manager for one shared [`FeedSocket`].
///
/// Cloning is cheap; all clones share the same count. Consumers call
/// [`acquire`](SharedFeed::acquire) to register interest and
/// [`release`](SharedFeed::release) when done. The underlying socket
/// connects while at least one consumer is registered, and is
/// suspended (not disabled) a grace window after the last release.
#[derive(Clone)]
pub struct SharedFeed {
    inner: Arc<SharedFeedInner>,
}

impl SharedFeed {
    /// Creates a shared feed over the given socket with the default
    /// grace window.
    #[must_use]
    pub fn new(socket: Arc<FeedSocket>) -> Self {
        Self::with_grace(socket, DEFAULT_GRACE)
    }

    /// Creates a shared feed with a custom grace window.
    #[must_use]
    pub fn with_grace(socket: Arc<FeedSocket>, grace: Duration) -> Self {
        Self {
            inner: Arc::new(SharedFeedInner {
                socket,
                grace,
                state: Mutex::new(ShareState {
                    refs: 0,
                    teardown: None,
                }),
            }),
        }
    }

    /// Returns the shared socket.
    #[must_use]
    pub fn socket(&self) -> &Arc<FeedSocket> {
        &self.inner.socket
    }

    /// Returns the current consumer count.
    #[must_use]
    pub fn consumers(&self) -> usize {
        self.inner.state.lock().refs
    }

    /// Registers a consumer. The first acquire resumes the socket;
    /// an acquire within the grace window cancels the pending
    /// teardown, keeping the existing connection.
    pub fn acquire(&self) {
        let mut state = self.inner.state.lock();
        if let Some(handle) = state.teardown.take() {
            handle.abort();
            debug!(feed = %self.inner.socket.config().feed, "Teardown cancelled, reusing connection");
        }
        state.refs += 1;
        let first = state.refs == 1;
        drop(state);

        if first {
            info!(feed = %self.inner.socket.config().feed, "First consumer, resuming feed");
            self.inner.socket.resume();
        }
    }

    /// Releases a consumer. When the count reaches zero the socket is
    /// suspended after the grace window elapses, unless `persist` is
    /// set or a new consumer acquires in the meantime.
    ///
    /// `persist` keeps the connection alive past the last consumer;
    /// callers use it when the feed should outlive its views (e.g. a
    /// background audio feed that keeps playing while no dashboard is
    /// mounted).
    pub fn release(&self, persist: bool) {
        let mut state = self.inner.state.lock();
        state.refs = state.refs.saturating_sub(1);
        if state.refs > 0 {
            return;
        }
        if persist {
            debug!(feed = %self.inner.socket.config().feed, "Last consumer gone, persisting connection");
            return;
        }

        // Defer teardown so a consumer returning within the window
        // reuses the connection.
        let inner = Arc::clone(&self.inner);
        let grace = self.inner.grace;
        state.teardown = Some(tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            let mut state = inner.state.lock();
            if state.refs == 0 {
                state.teardown = None;
                drop(state);
                info!(feed = %inner.socket.config().feed, "Grace window elapsed, suspending feed");
                inner.socket.suspend();
            }
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::{ConnectionState, FeedKind, SocketConfig};

    fn unreachable_socket() -> Arc<FeedSocket> {
        // Connection attempts against this endpoint fail fast; these
        // tests only observe the enable/suspend lifecycle.
        let config = SocketConfig::builder()
            .url("ws://127.0.0.1:1")
            .feed("messages")
            .reconnect_delay(Duration::from_secs(60))
            .jitter_fraction(0.0)
            .build();
        let socket = Arc::new(FeedSocket::new(config, FeedKind::Messages));
        socket.enable();
        socket.suspend();
        socket
    }

    #[tokio::test]
    async fn test_acquire_release_counts() {
        let shared = SharedFeed::with_grace(unreachable_socket(), Duration::from_millis(50));
        assert_eq!(shared.consumers(), 0);

        shared.acquire();
        shared.acquire();
        assert_eq!(shared.consumers(), 2);

        shared.release(false);
        assert_eq!(shared.consumers(), 1);
        // One consumer remains: no teardown scheduled.
        assert!(shared.inner.state.lock().teardown.is_none());

        shared.release(false);
        assert_eq!(shared.consumers(), 0);
        shared.socket().disable();
    }

    #[tokio::test]
    async fn test_teardown_after_grace() {
        let socket = unreachable_socket();
        let shared = SharedFeed::with_grace(Arc::clone(&socket), Duration::from_millis(50));

        shared.acquire();
        shared.release(false);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(socket.connection_state(), ConnectionState::Idle);
        assert!(socket.is_enabled());
        socket.disable();
    }

    #[tokio::test]
    async fn test_reacquire_within_grace_cancels_teardown() {
        let socket = unreachable_socket();
        let shared = SharedFeed::with_grace(Arc::clone(&socket), Duration::from_millis(200));

        shared.acquire();
        shared.release(false);
        assert!(shared.inner.state.lock().teardown.is_some());

        shared.acquire();
        assert!(shared.inner.state.lock().teardown.is_none());

        // Well past the original grace window the feed is still up.
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_ne!(socket.connection_state(), ConnectionState::Idle);

        shared.release(false);
        socket.disable();
    }

    #[tokio::test]
    async fn test_persist_skips_teardown() {
        let socket = unreachable_socket();
        let shared = SharedFeed::with_grace(Arc::clone(&socket), Duration::from_millis(50));

        shared.acquire();
        shared.release(true);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(shared.inner.state.lock().teardown.is_none());
        assert_ne!(socket.connection_state(), ConnectionState::Idle);
        socket.disable();
    }
}
