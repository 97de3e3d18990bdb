//! Reconnecting feed socket implementation.

#![allow(clippy::too_many_lines)]
#![allow(clippy::significant_drop_tightening)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, sleep, timeout, MissedTickBehavior};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message as TungsteniteMessage;
use tracing::{debug, error, info, warn};

use pulsefeed_core::types::ConnectionStatus;

use super::config::SocketConfig;
use super::frame::{FeedFrame, FeedKind};
use super::state::SocketState;

/// Handle identifying one subscriber registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Returns the raw id value.
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Subscriber trait for feed socket events.
///
/// Registration is explicit: [`FeedSocket::subscribe`] returns a
/// [`SubscriptionId`] handle that [`FeedSocket::unsubscribe`] removes.
#[async_trait]
pub trait FeedSubscriber: Send + Sync {
    /// Called for every decoded inbound frame.
    async fn on_frame(&self, frame: FeedFrame);

    /// Called when the connection status changes.
    async fn on_status(&self, status: ConnectionStatus) {
        let _ = status;
    }

    /// Returns the subscriber name, used in logs.
    fn name(&self) -> &str;
}

type Subscribers = Arc<RwLock<HashMap<SubscriptionId, Arc<dyn FeedSubscriber>>>>;

struct Supervisor {
    run_tx: watch::Sender<bool>,
    task: tokio::task::JoinHandle<()>,
}

/// Reconnecting socket client for one logical feed.
///
/// Owns exactly one transport connection to a single endpoint and
/// keeps it alive indefinitely while enabled: connect attempts are
/// throttled, failures retried with capped exponential backoff plus
/// jitter, and silent hangs force-closed by a liveness check. None of
/// the public operations return errors; all failure states surface
/// only through [`ConnectionStatus`] events.
///
/// # Example
///
/// ```ignore
/// use pulsefeed_client::ws::{FeedKind, FeedSocket, SocketConfig};
///
/// let config = SocketConfig::builder()
///     .url("wss://feed.example.com/ws/messages")
///     .feed("messages")
///     .build();
///
/// let socket = FeedSocket::new(config, FeedKind::Messages);
/// socket.enable();
/// ```
pub struct FeedSocket {
    config: SocketConfig,
    kind: FeedKind,
    state: Arc<RwLock<SocketState>>,
    subscribers: Subscribers,
    next_subscription_id: AtomicU64,
    send_slot: Arc<RwLock<Option<mpsc::Sender<String>>>>,
    supervisor: Mutex<Option<Supervisor>>,
}

impl FeedSocket {
    /// Creates a new feed socket. No connection is attempted until
    /// [`enable`](Self::enable) is called.
    #[must_use]
    pub fn new(config: SocketConfig, kind: FeedKind) -> Self {
        Self {
            config,
            kind,
            state: Arc::new(RwLock::new(SocketState::new())),
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            next_subscription_id: AtomicU64::new(1),
            send_slot: Arc::new(RwLock::new(None)),
            supervisor: Mutex::new(None),
        }
    }

    /// Returns the socket configuration.
    #[must_use]
    pub fn config(&self) -> &SocketConfig {
        &self.config
    }

    /// Returns the current status snapshot.
    #[must_use]
    pub fn status(&self) -> ConnectionStatus {
        self.state.read().status()
    }

    /// Returns whether the socket is currently open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.read().state.is_open()
    }

    /// Returns whether the feed toggle is on.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.state.read().enabled
    }

    /// Returns the current connection state.
    #[must_use]
    pub fn connection_state(&self) -> super::ConnectionState {
        self.state.read().state
    }

    /// Returns the number of reconnection attempts since the last
    /// successful open.
    #[must_use]
    pub fn reconnect_attempts(&self) -> u32 {
        self.state.read().reconnect_attempts
    }

    /// Registers a subscriber, returning its handle.
    pub fn subscribe(&self, subscriber: Arc<dyn FeedSubscriber>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription_id.fetch_add(1, Ordering::Relaxed));
        info!(
            feed = %self.config.feed,
            subscription_id = %id,
            subscriber = %subscriber.name(),
            "Subscriber registered"
        );
        self.subscribers.write().insert(id, subscriber);
        id
    }

    /// Removes a subscriber registration.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        if let Some(subscriber) = self.subscribers.write().remove(&id) {
            info!(
                feed = %self.config.feed,
                subscription_id = %id,
                subscriber = %subscriber.name(),
                "Subscriber unregistered"
            );
        }
    }

    /// Turns the feed on and starts connecting. Idempotent.
    pub fn enable(&self) {
        self.state.write().mark_enabled();
        self.spawn_supervisor();
        debug!(feed = %self.config.feed, "Feed enabled");
    }

    /// Turns the feed off: closes any open or opening transport,
    /// cancels pending reconnect and liveness timers, and emits a
    /// disconnected status. Idempotent. This is the only way to
    /// permanently stop retries.
    pub fn disable(&self) {
        self.state.write().mark_disabled();
        let had_supervisor = self.stop_supervisor();
        self.send_slot.write().take();

        // A running supervisor broadcasts the disabled status on its
        // shutdown path; only broadcast here when there was none.
        if !had_supervisor {
            let subscribers = Arc::clone(&self.subscribers);
            let status = self.status();
            tokio::spawn(async move {
                broadcast_status(&subscribers, status).await;
            });
        }
        debug!(feed = %self.config.feed, "Feed disabled");
    }

    /// Resumes connecting after a [`suspend`](Self::suspend), without
    /// touching the enabled toggle. Returns false when the feed is
    /// disabled.
    pub fn resume(&self) -> bool {
        if !self.is_enabled() {
            return false;
        }
        self.spawn_supervisor();
        true
    }

    /// Closes the transport and stops retrying, without flipping the
    /// enabled toggle. Used by the connection-sharing layer when the
    /// last consumer releases the feed.
    pub fn suspend(&self) {
        self.stop_supervisor();
        self.send_slot.write().take();
        self.state.write().mark_idle();
        debug!(feed = %self.config.feed, "Feed suspended");
    }

    /// Sends a text payload if the socket is open.
    ///
    /// Returns false, without error, when the socket is not open or
    /// the outbound buffer is full.
    pub fn try_send(&self, text: impl Into<String>) -> bool {
        let slot = self.send_slot.read();
        match slot.as_ref() {
            Some(tx) => tx.try_send(text.into()).is_ok(),
            None => false,
        }
    }

    fn spawn_supervisor(&self) {
        let mut slot = self.supervisor.lock();
        if let Some(existing) = slot.as_ref() {
            if !existing.task.is_finished() {
                return;
            }
        }

        let (run_tx, run_rx) = watch::channel(true);
        let task = tokio::spawn(run_supervisor(
            self.config.clone(),
            self.kind,
            Arc::clone(&self.state),
            Arc::clone(&self.subscribers),
            Arc::clone(&self.send_slot),
            run_rx,
        ));
        *slot = Some(Supervisor { run_tx, task });
    }

    /// Signals the supervisor to stop. Returns whether one was
    /// running.
    fn stop_supervisor(&self) -> bool {
        match self.supervisor.lock().take() {
            Some(supervisor) => {
                let _ = supervisor.run_tx.send(false);
                !supervisor.task.is_finished()
            }
            None => false,
        }
    }
}

impl Drop for FeedSocket {
    fn drop(&mut self) {
        self.stop_supervisor();
    }
}

/// Connect/retry loop. Runs until told to stop via the watch channel.
async fn run_supervisor(
    config: SocketConfig,
    kind: FeedKind,
    state: Arc<RwLock<SocketState>>,
    subscribers: Subscribers,
    send_slot: Arc<RwLock<Option<mpsc::Sender<String>>>>,
    mut run_rx: watch::Receiver<bool>,
) {
    loop {
        if !*run_rx.borrow() {
            break;
        }

        // Throttle connect attempts to avoid connection storms.
        let wait = state
            .read()
            .connect_throttle_remaining(config.min_connect_interval());
        if !wait.is_zero() && !sleep_or_stop(wait, &mut run_rx).await {
            break;
        }

        state.write().mark_connecting();
        let status = state.read().status();
        broadcast_status(&subscribers, status).await;
        debug!(feed = %config.feed, url = %config.url, "Connecting");

        let attempt = tokio::select! {
            result = timeout(config.connect_timeout(), connect_async(config.url.as_str())) => Some(result),
            _ = run_rx.changed() => None,
        };

        let ws_stream = match attempt {
            None => continue,
            Some(Err(_)) => {
                warn!(
                    feed = %config.feed,
                    timeout_ms = config.connect_timeout_ms,
                    "Connect attempt timed out"
                );
                if !retry_delay(&config, &state, &subscribers, &mut run_rx).await {
                    break;
                }
                continue;
            }
            Some(Ok(Err(e))) => {
                warn!(feed = %config.feed, error = %e, "Connection failed");
                if !retry_delay(&config, &state, &subscribers, &mut run_rx).await {
                    break;
                }
                continue;
            }
            Some(Ok(Ok((ws_stream, _response)))) => ws_stream,
        };

        info!(feed = %config.feed, url = %config.url, "Feed connected");
        state.write().mark_open();
        let status = state.read().status();
        broadcast_status(&subscribers, status).await;

        let reason = run_connection(
            &config,
            kind,
            &state,
            &subscribers,
            &send_slot,
            &mut run_rx,
            ws_stream,
        )
        .await;
        send_slot.write().take();

        if !*run_rx.borrow() {
            break;
        }

        warn!(feed = %config.feed, reason = %reason, "Feed disconnected");
        if !retry_delay(&config, &state, &subscribers, &mut run_rx).await {
            break;
        }
    }

    state.write().mark_idle();
    let status = state.read().status();
    broadcast_status(&subscribers, status).await;
    debug!(feed = %config.feed, "Feed supervisor stopped");
}

/// Marks the reconnect, emits status, and waits out the backoff delay.
/// Returns false when the supervisor should stop instead of retrying.
async fn retry_delay(
    config: &SocketConfig,
    state: &Arc<RwLock<SocketState>>,
    subscribers: &Subscribers,
    run_rx: &mut watch::Receiver<bool>,
) -> bool {
    state.write().mark_reconnecting(config.attempt_wrap);
    let status = state.read().status();
    broadcast_status(subscribers, status).await;

    let attempt = state.read().reconnect_attempts;
    let delay = config.reconnect_delay_for(attempt);
    debug!(
        feed = %config.feed,
        attempt = attempt,
        delay_ms = delay.as_millis() as u64,
        "Scheduling reconnect"
    );
    sleep_or_stop(delay, run_rx).await
}

/// Sleeps for the given duration, returning early with false when the
/// run flag flips off.
async fn sleep_or_stop(duration: Duration, run_rx: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        () = sleep(duration) => true,
        _ = run_rx.changed() => *run_rx.borrow(),
    }
}

/// Pumps one established connection until it ends. Returns the
/// disconnect reason for logging.
async fn run_connection(
    config: &SocketConfig,
    kind: FeedKind,
    state: &Arc<RwLock<SocketState>>,
    subscribers: &Subscribers,
    send_slot: &Arc<RwLock<Option<mpsc::Sender<String>>>>,
    run_rx: &mut watch::Receiver<bool>,
    ws_stream: tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
) -> String {
    let (mut sink, mut stream) = ws_stream.split();

    let (send_tx, mut send_rx) = mpsc::channel::<String>(100);
    *send_slot.write() = Some(send_tx);

    let mut liveness = interval(config.liveness_interval());
    liveness.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            // Shutdown / suspend signal
            _ = run_rx.changed() => {
                if !*run_rx.borrow() {
                    state.write().mark_closing();
                    let _ = sink.close().await;
                    return "shutdown".to_string();
                }
            }

            // Outgoing messages
            Some(text) = send_rx.recv() => {
                if let Err(e) = sink.send(TungsteniteMessage::Text(text)).await {
                    warn!(feed = %config.feed, error = %e, "Failed to send message");
                }
            }

            // Incoming frames
            next = stream.next() => {
                match next {
                    Some(Ok(msg)) => {
                        state.write().record_activity();
                        match msg {
                            TungsteniteMessage::Text(text) => {
                                match FeedFrame::decode(kind, &text) {
                                    Ok(frame) => broadcast_frame(subscribers, frame).await,
                                    Err(e) => warn!(
                                        feed = %config.feed,
                                        error = %e,
                                        "Dropping undecodable frame"
                                    ),
                                }
                            }
                            TungsteniteMessage::Ping(data) => {
                                if let Err(e) = sink.send(TungsteniteMessage::Pong(data)).await {
                                    warn!(feed = %config.feed, error = %e, "Failed to send pong");
                                }
                            }
                            TungsteniteMessage::Close(_) => {
                                info!(feed = %config.feed, "Server sent close frame");
                                return "server closed connection".to_string();
                            }
                            _ => {}
                        }
                    }
                    Some(Err(e)) => {
                        error!(feed = %config.feed, error = %e, "WebSocket error");
                        return e.to_string();
                    }
                    None => {
                        return "stream ended".to_string();
                    }
                }
            }

            // Liveness check: a silent hang counts as a failure even
            // without a transport-level error.
            _ = liveness.tick() => {
                if state.read().is_stale(config.stale_after()) {
                    warn!(
                        feed = %config.feed,
                        stale_after_ms = config.stale_after().as_millis() as u64,
                        "No activity within liveness window, forcing reconnect"
                    );
                    let _ = sink.close().await;
                    return "stale connection".to_string();
                }
            }
        }
    }
}

async fn broadcast_status(subscribers: &Subscribers, status: ConnectionStatus) {
    let subs: Vec<_> = subscribers.read().values().cloned().collect();
    for subscriber in subs {
        subscriber.on_status(status).await;
    }
}

async fn broadcast_frame(subscribers: &Subscribers, frame: FeedFrame) {
    let subs: Vec<_> = subscribers.read().values().cloned().collect();
    for subscriber in subs {
        subscriber.on_frame(frame.clone()).await;
    }
}

/// Subscriber that forwards frames to an mpsc channel.
pub struct ChannelSubscriber {
    name: String,
    frames: mpsc::Sender<FeedFrame>,
}

impl ChannelSubscriber {
    /// Creates a new channel subscriber from an existing sender.
    #[must_use]
    pub fn new(name: impl Into<String>, frames: mpsc::Sender<FeedFrame>) -> Self {
        Self {
            name: name.into(),
            frames,
        }
    }

    /// Creates a channel subscriber with a new channel, returning the
    /// subscriber and the receiver.
    #[must_use]
    pub fn with_channel(
        name: impl Into<String>,
        buffer: usize,
    ) -> (Self, mpsc::Receiver<FeedFrame>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self::new(name, tx), rx)
    }
}

#[async_trait]
impl FeedSubscriber for ChannelSubscriber {
    async fn on_frame(&self, frame: FeedFrame) {
        if let Err(e) = self.frames.send(frame).await {
            warn!(subscriber = %self.name, error = %e, "Failed to forward frame");
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
