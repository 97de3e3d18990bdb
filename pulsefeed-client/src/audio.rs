//! Audio notification queue.
//!
//! Strict one-at-a-time playback over an [`AudioSink`] collaborator.
//! Notifications pile up in a FIFO while something is playing, while
//! the queue is waiting for the browser-style user-interaction
//! unlock, or while the feed is disabled. Duplicate URLs are dropped
//! at the boundary; URLs already played this session never replay.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, info, warn};

use pulsefeed_core::error::PlaybackError;
use pulsefeed_core::types::{AudioNotification, AudioQueueStatus, Ticker};

/// Minimum accepted playback rate.
pub const MIN_PLAYBACK_RATE: f64 = 0.1;
/// Maximum accepted playback rate.
pub const MAX_PLAYBACK_RATE: f64 = 10.0;

/// Playback collaborator. The embedding UI supplies the actual audio
/// element / device binding.
///
/// `stop()` must promptly resolve any in-flight `load` or
/// `play_to_end` future, typically with [`PlaybackError::Aborted`];
/// the queue relies on this for immediate disable and stuck-state
/// recovery.
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Loads a clip at the given playback rate. Resolves when the
    /// clip is ready to play. The queue applies the load timeout; the
    /// sink does not need its own.
    async fn load(&self, url: &str, rate: f64) -> Result<(), PlaybackError>;

    /// Plays the loaded clip to completion.
    async fn play_to_end(&self) -> Result<(), PlaybackError>;

    /// Halts any in-flight load or playback.
    fn stop(&self);

    /// Returns whether the sink is actively playing.
    fn is_active(&self) -> bool;
}

/// Configuration for the audio queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioQueueConfig {
    /// Clip load timeout in milliseconds. A load exceeding this is
    /// abandoned without retry and the queue advances.
    #[serde(default = "default_load_timeout_ms")]
    pub load_timeout_ms: u64,

    /// Interval of the stuck-state check in milliseconds.
    #[serde(default = "default_stuck_check_interval_ms")]
    pub stuck_check_interval_ms: u64,

    /// Initial playback rate.
    #[serde(default = "default_playback_rate")]
    pub default_playback_rate: f64,
}

fn default_load_timeout_ms() -> u64 {
    10_000
}

fn default_stuck_check_interval_ms() -> u64 {
    1_000
}

fn default_playback_rate() -> f64 {
    1.75
}

impl Default for AudioQueueConfig {
    fn default() -> Self {
        Self {
            load_timeout_ms: default_load_timeout_ms(),
            stuck_check_interval_ms: default_stuck_check_interval_ms(),
            default_playback_rate: default_playback_rate(),
        }
    }
}

impl AudioQueueConfig {
    /// Returns the load timeout as a Duration.
    #[must_use]
    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    /// Returns the stuck-check interval as a Duration.
    #[must_use]
    pub fn stuck_check_interval(&self) -> Duration {
        Duration::from_millis(self.stuck_check_interval_ms)
    }
}

struct QueueState {
    pending: VecDeque<AudioNotification>,
    current: Option<AudioNotification>,
    playing: bool,
    enabled: bool,
    unlocked: bool,
    playback_rate: f64,
    last_played_url: Option<String>,
    played_urls: HashSet<String>,
    watchlist: Option<HashSet<Ticker>>,
    interaction_hint: bool,
    /// Bumped on disable so in-flight playback outcomes from the old
    /// generation cannot touch the reset state.
    generation: u64,
}

/// One-at-a-time audio notification queue.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use pulsefeed_client::audio::{AudioQueue, AudioQueueConfig};
///
/// let queue = AudioQueue::new(AudioQueueConfig::default(), sink);
/// queue.start();
/// queue.enable();
/// queue.set_unlocked(true); // after a user gesture
/// queue.enqueue(notification);
/// ```
pub struct AudioQueue {
    config: AudioQueueConfig,
    sink: Arc<dyn AudioSink>,
    state: Arc<RwLock<QueueState>>,
    wake: Arc<Notify>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl AudioQueue {
    /// Creates a new queue over the given sink. Playback starts only
    /// after [`start`](Self::start), [`enable`](Self::enable), and the
    /// interaction unlock.
    #[must_use]
    pub fn new(config: AudioQueueConfig, sink: Arc<dyn AudioSink>) -> Self {
        let playback_rate = config
            .default_playback_rate
            .clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE);
        Self {
            config,
            sink,
            state: Arc::new(RwLock::new(QueueState {
                pending: VecDeque::new(),
                current: None,
                playing: false,
                enabled: false,
                unlocked: false,
                playback_rate,
                last_played_url: None,
                played_urls: HashSet::new(),
                watchlist: None,
                interaction_hint: false,
                generation: 0,
            })),
            wake: Arc::new(Notify::new()),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Spawns the pump and stuck-check tasks. Idempotent.
    pub fn start(&self) {
        let mut tasks = self.tasks.lock();
        if !tasks.is_empty() {
            return;
        }
        tasks.push(tokio::spawn(pump_loop(
            self.config.clone(),
            Arc::clone(&self.sink),
            Arc::clone(&self.state),
            Arc::clone(&self.wake),
        )));
        tasks.push(tokio::spawn(stuck_loop(
            self.config.clone(),
            Arc::clone(&self.sink),
            Arc::clone(&self.state),
        )));
    }

    /// Stops the background tasks.
    pub fn shutdown(&self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
        self.sink.stop();
    }

    /// Offers a notification to the queue. Returns whether it was
    /// accepted into the pending FIFO.
    ///
    /// Dropped (with a debug log, never an error) when the queue is
    /// disabled, the watchlist excludes the ticker, the URL is
    /// already pending or playing, or the URL was already played this
    /// session.
    pub fn enqueue(&self, notification: AudioNotification) -> bool {
        let mut state = self.state.write();
        if !state.enabled {
            debug!(url = %notification.audio_url, "Audio disabled, dropping notification");
            return false;
        }
        if let Some(watchlist) = &state.watchlist {
            let in_watchlist = notification
                .ticker()
                .is_some_and(|t| watchlist.contains(t));
            if !in_watchlist {
                debug!(
                    url = %notification.audio_url,
                    ticker = ?notification.ticker(),
                    "Ticker outside watchlist, dropping notification"
                );
                return false;
            }
        }
        if state.played_urls.contains(&notification.audio_url) {
            debug!(url = %notification.audio_url, "URL already played this session, dropping");
            return false;
        }
        let already_queued = state
            .pending
            .iter()
            .any(|p| p.audio_url == notification.audio_url)
            || state
                .current
                .as_ref()
                .is_some_and(|c| c.audio_url == notification.audio_url);
        if already_queued {
            debug!(url = %notification.audio_url, "URL already queued, dropping duplicate");
            return false;
        }

        debug!(
            url = %notification.audio_url,
            message_id = %notification.message_id,
            depth = state.pending.len() + 1,
            "Audio notification queued"
        );
        state.pending.push_back(notification);
        drop(state);
        self.wake.notify_one();
        true
    }

    /// Enables the queue. Playback still requires the interaction
    /// unlock.
    pub fn enable(&self) {
        self.state.write().enabled = true;
        self.wake.notify_one();
    }

    /// Disables the queue: clears all pending notifications, stops
    /// the current playback immediately, and forgets the current
    /// item. Re-enabling starts from an empty queue.
    pub fn disable(&self) {
        {
            let mut state = self.state.write();
            state.enabled = false;
            state.pending.clear();
            state.current = None;
            state.playing = false;
            state.generation += 1;
        }
        self.sink.stop();
        debug!("Audio queue disabled and cleared");
    }

    /// Records the user-interaction unlock state. Browsers only allow
    /// playback after a gesture; until unlocked, notifications
    /// accumulate.
    pub fn set_unlocked(&self, unlocked: bool) {
        self.state.write().unlocked = unlocked;
        if unlocked {
            self.wake.notify_one();
        }
    }

    /// Sets the playback rate, clamped to the accepted range.
    pub fn set_playback_rate(&self, rate: f64) {
        let clamped = rate.clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE);
        self.state.write().playback_rate = clamped;
    }

    /// Returns the current playback rate.
    #[must_use]
    pub fn playback_rate(&self) -> f64 {
        self.state.read().playback_rate
    }

    /// Sets the ticker watchlist. `None` or an empty list disables
    /// the gate.
    pub fn set_watchlist(&self, watchlist: Option<Vec<Ticker>>) {
        let normalized = watchlist
            .map(|list| list.into_iter().collect::<HashSet<_>>())
            .filter(|set| !set.is_empty());
        self.state.write().watchlist = normalized;
    }

    /// Takes the pending one-time interaction hint, if playback was
    /// blocked waiting for a user gesture.
    #[must_use]
    pub fn take_interaction_hint(&self) -> bool {
        std::mem::take(&mut self.state.write().interaction_hint)
    }

    /// Returns the URL of the last clip played to completion.
    #[must_use]
    pub fn last_played_url(&self) -> Option<String> {
        self.state.read().last_played_url.clone()
    }

    /// Returns the status snapshot.
    #[must_use]
    pub fn status(&self) -> AudioQueueStatus {
        let state = self.state.read();
        AudioQueueStatus {
            currently_playing: state.current.clone(),
            queue_depth: state.pending.len(),
            enabled: state.enabled,
        }
    }
}

impl Drop for AudioQueue {
    fn drop(&mut self) {
        for task in self.tasks.lock().drain(..) {
            task.abort();
        }
    }
}

/// Takes the next playable item off the FIFO, skipping URLs that
/// already played.
fn dequeue_next(state: &mut QueueState) -> Option<AudioNotification> {
    while let Some(notification) = state.pending.pop_front() {
        if state.last_played_url.as_deref() == Some(notification.audio_url.as_str()) {
            debug!(url = %notification.audio_url, "Skipping last played URL");
            continue;
        }
        if state.played_urls.contains(&notification.audio_url) {
            debug!(url = %notification.audio_url, "Skipping already played URL");
            continue;
        }
        state.current = Some(notification.clone());
        state.playing = false;
        return Some(notification);
    }
    None
}

async fn pump_loop(
    config: AudioQueueConfig,
    sink: Arc<dyn AudioSink>,
    state: Arc<RwLock<QueueState>>,
    wake: Arc<Notify>,
) {
    loop {
        let next = {
            let mut st = state.write();
            if st.enabled && st.unlocked && st.current.is_none() {
                dequeue_next(&mut st).map(|n| (n, st.generation))
            } else {
                None
            }
        };

        match next {
            Some((notification, generation)) => {
                play_one(&config, &sink, &state, notification, generation).await;
            }
            None => wake.notified().await,
        }
    }
}

async fn play_one(
    config: &AudioQueueConfig,
    sink: &Arc<dyn AudioSink>,
    state: &Arc<RwLock<QueueState>>,
    notification: AudioNotification,
    generation: u64,
) {
    let url = notification.audio_url.clone();
    let rate = state.read().playback_rate;
    debug!(url = %url, rate = rate, "Loading audio clip");

    match timeout(config.load_timeout(), sink.load(&url, rate)).await {
        Err(_) => {
            warn!(
                url = %url,
                timeout_ms = config.load_timeout_ms,
                "Audio load timed out, abandoning clip"
            );
            finish(state, generation, None);
        }
        Ok(Err(error)) => {
            handle_playback_error(state, notification, generation, &error);
        }
        Ok(Ok(())) => {
            {
                let mut st = state.write();
                if st.generation != generation {
                    return;
                }
                st.playing = true;
            }
            match sink.play_to_end().await {
                Ok(()) => {
                    info!(
                        url = %url,
                        message_id = %notification.message_id,
                        "Audio clip finished"
                    );
                    finish(state, generation, Some(&url));
                }
                Err(error) => {
                    handle_playback_error(state, notification, generation, &error);
                }
            }
        }
    }
}

/// Clears the current slot so the queue advances. `completed_url`
/// marks the clip as played for the rest of the session.
fn finish(state: &Arc<RwLock<QueueState>>, generation: u64, completed_url: Option<&str>) {
    let mut st = state.write();
    if st.generation != generation {
        return;
    }
    st.current = None;
    st.playing = false;
    if let Some(url) = completed_url {
        st.last_played_url = Some(url.to_string());
        st.played_urls.insert(url.to_string());
    }
}

fn handle_playback_error(
    state: &Arc<RwLock<QueueState>>,
    notification: AudioNotification,
    generation: u64,
    error: &PlaybackError,
) {
    if error.needs_interaction_hint() {
        warn!(
            url = %notification.audio_url,
            "Autoplay blocked, holding queue until user interaction"
        );
        let mut st = state.write();
        if st.generation != generation {
            return;
        }
        st.unlocked = false;
        st.interaction_hint = true;
        st.current = None;
        st.playing = false;
        // The clip was not played; it goes back to the front so the
        // unlock resumes exactly where playback stopped.
        st.pending.push_front(notification);
        return;
    }

    if error.is_expected_noise() {
        debug!(url = %notification.audio_url, error = %error, "Playback interrupted");
    } else {
        warn!(url = %notification.audio_url, error = %error, "Playback failed");
    }
    finish(state, generation, None);
}

/// Corrects a playing flag that disagrees with the sink. A sink that
/// went inactive without resolving its playback future would
/// otherwise wedge the queue forever.
async fn stuck_loop(
    config: AudioQueueConfig,
    sink: Arc<dyn AudioSink>,
    state: Arc<RwLock<QueueState>>,
) {
    let mut ticker = interval(config.stuck_check_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut strikes = 0u32;
    loop {
        ticker.tick().await;
        let stuck = {
            let st = state.read();
            st.playing && !sink.is_active()
        };
        if !stuck {
            strikes = 0;
            continue;
        }
        // A single disagreeing tick can be sink startup latency; two
        // in a row is a wedge.
        strikes += 1;
        if strikes >= 2 {
            warn!("Playback flag set but sink inactive, forcing stop");
            state.write().playing = false;
            sink.stop();
            strikes = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulsefeed_core::types::AudioMetadata;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn notification(id: &str, url: &str, ticker: Option<&str>) -> AudioNotification {
        AudioNotification {
            message_id: id.to_string(),
            audio_url: url.to_string(),
            bucket: None,
            key: None,
            content_type: Some("audio/mpeg".to_string()),
            size: None,
            metadata: AudioMetadata {
                ticker: ticker.map(|t| Ticker::new(t).unwrap()),
                company_name: None,
            },
        }
    }

    #[derive(Default)]
    struct FakeSinkState {
        loads: Vec<(String, f64)>,
        played: Vec<String>,
        fail_load_with: Option<PlaybackError>,
        hang_load: bool,
        lie_inactive: bool,
        activation_delay: Option<Duration>,
    }

    struct FakeSink {
        state: Mutex<FakeSinkState>,
        active: AtomicBool,
        stopped: Notify,
        play_duration: Duration,
    }

    impl FakeSink {
        fn new(play_duration: Duration) -> Arc<Self> {
            Arc::new(Self {
                state: Mutex::new(FakeSinkState::default()),
                active: AtomicBool::new(false),
                stopped: Notify::new(),
                play_duration,
            })
        }

        fn played(&self) -> Vec<String> {
            self.state.lock().played.clone()
        }

        fn loads(&self) -> Vec<(String, f64)> {
            self.state.lock().loads.clone()
        }
    }

    #[async_trait]
    impl AudioSink for FakeSink {
        async fn load(&self, url: &str, rate: f64) -> Result<(), PlaybackError> {
            let hang = {
                let mut st = self.state.lock();
                st.loads.push((url.to_string(), rate));
                if let Some(error) = st.fail_load_with.take() {
                    return Err(error);
                }
                st.hang_load
            };
            if hang {
                futures::future::pending::<()>().await;
            }
            Ok(())
        }

        async fn play_to_end(&self) -> Result<(), PlaybackError> {
            let (lie, delay) = {
                let st = self.state.lock();
                (st.lie_inactive, st.activation_delay)
            };
            let outcome = tokio::select! {
                () = async {
                    if let Some(delay) = delay {
                        tokio::time::sleep(delay).await;
                    }
                    if !lie {
                        self.active.store(true, Ordering::SeqCst);
                    }
                    tokio::time::sleep(self.play_duration).await;
                } => {
                    let mut st = self.state.lock();
                    if let Some((url, _)) = st.loads.last().cloned() {
                        st.played.push(url);
                    }
                    Ok(())
                }
                () = self.stopped.notified() => Err(PlaybackError::Aborted),
            };
            self.active.store(false, Ordering::SeqCst);
            outcome
        }

        fn stop(&self) {
            self.active.store(false, Ordering::SeqCst);
            self.stopped.notify_waiters();
        }

        fn is_active(&self) -> bool {
            self.active.load(Ordering::SeqCst)
        }
    }

    fn ready_queue(sink: Arc<FakeSink>) -> AudioQueue {
        let queue = AudioQueue::new(AudioQueueConfig::default(), sink);
        queue.start();
        queue.enable();
        queue.set_unlocked(true);
        queue
    }

    #[tokio::test(start_paused = true)]
    async fn test_plays_one_at_a_time_in_order() {
        let sink = FakeSink::new(Duration::from_secs(1));
        let queue = ready_queue(Arc::clone(&sink));

        assert!(queue.enqueue(notification("m1", "u1", None)));
        assert!(queue.enqueue(notification("m2", "u2", None)));
        assert!(queue.enqueue(notification("m3", "u3", None)));

        // While the first clip plays, the rest stay pending.
        tokio::time::sleep(Duration::from_millis(500)).await;
        let status = queue.status();
        assert_eq!(
            status.currently_playing.as_ref().map(|n| n.audio_url.as_str()),
            Some("u1")
        );
        assert_eq!(status.queue_depth, 2);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(sink.played(), vec!["u1", "u2", "u3"]);
        assert_eq!(queue.status().queue_depth, 0);
        assert_eq!(queue.last_played_url(), Some("u3".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_pending_url_dropped() {
        let sink = FakeSink::new(Duration::from_secs(60));
        let queue = ready_queue(sink);
        // No unlock-free slot: keep everything pending by not playing.
        queue.set_unlocked(false);

        assert!(queue.enqueue(notification("m1", "same", None)));
        assert!(!queue.enqueue(notification("m2", "same", None)));
        assert_eq!(queue.status().queue_depth, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_played_url_never_replays() {
        let sink = FakeSink::new(Duration::from_secs(1));
        let queue = ready_queue(Arc::clone(&sink));

        assert!(queue.enqueue(notification("m1", "u1", None)));
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(sink.played(), vec!["u1"]);

        // A later notification with the same URL is dropped.
        assert!(!queue.enqueue(notification("m9", "u1", None)));
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(sink.played(), vec!["u1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_drops_and_disable_clears() {
        let sink = FakeSink::new(Duration::from_secs(60));
        let queue = ready_queue(Arc::clone(&sink));

        assert!(queue.enqueue(notification("m1", "u1", None)));
        assert!(queue.enqueue(notification("m2", "u2", None)));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(queue.status().currently_playing.is_some());

        queue.disable();
        let status = queue.status();
        assert!(!status.enabled);
        assert!(status.currently_playing.is_none());
        assert_eq!(status.queue_depth, 0);
        assert!(!sink.is_active());

        // Disabled queue accepts nothing.
        assert!(!queue.enqueue(notification("m3", "u3", None)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_autoplay_blocked_holds_until_unlock() {
        let sink = FakeSink::new(Duration::from_secs(1));
        sink.state.lock().fail_load_with = Some(PlaybackError::AutoplayBlocked);
        let queue = ready_queue(Arc::clone(&sink));

        assert!(queue.enqueue(notification("m1", "u1", None)));
        tokio::time::sleep(Duration::from_millis(100)).await;

        // The clip went back to pending and a hint was raised.
        assert_eq!(queue.status().queue_depth, 1);
        assert!(queue.take_interaction_hint());
        assert!(!queue.take_interaction_hint());

        // The unlock resumes from where playback stopped.
        queue.set_unlocked(true);
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(sink.played(), vec!["u1"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_timeout_abandons_clip() {
        let sink = FakeSink::new(Duration::from_secs(1));
        sink.state.lock().hang_load = true;
        let queue = ready_queue(Arc::clone(&sink));

        assert!(queue.enqueue(notification("m1", "hung", None)));

        // The load hangs past the 10s timeout and is abandoned.
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert!(queue.status().currently_playing.is_none());
        assert!(sink.played().is_empty());

        // The queue is not wedged: the next clip plays normally.
        sink.state.lock().hang_load = false;
        assert!(queue.enqueue(notification("m2", "u2", None)));
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert_eq!(sink.played(), vec!["u2"]);
        assert_eq!(queue.status().queue_depth, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchlist_gates_enqueue() {
        let sink = FakeSink::new(Duration::from_secs(1));
        let queue = ready_queue(sink);
        queue.set_watchlist(Some(vec![Ticker::new("AAPL").unwrap()]));

        assert!(queue.enqueue(notification("m1", "u1", Some("AAPL"))));
        assert!(!queue.enqueue(notification("m2", "u2", Some("MSFT"))));
        // No ticker metadata fails a non-empty watchlist.
        assert!(!queue.enqueue(notification("m3", "u3", None)));

        // An empty watchlist disables the gate.
        queue.set_watchlist(Some(Vec::new()));
        assert!(queue.enqueue(notification("m4", "u4", Some("MSFT"))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stuck_check_recovers_wedged_playback() {
        let sink = FakeSink::new(Duration::from_secs(600));
        sink.state.lock().lie_inactive = true;
        let queue = ready_queue(Arc::clone(&sink));

        assert!(queue.enqueue(notification("m1", "u1", None)));

        // The clip reports inactive while the playing flag is set;
        // after two consecutive disagreeing ticks the stuck check
        // stops it and clears the slot.
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(queue.status().currently_playing.is_none());
        assert!(sink.played().is_empty());

        // The queue keeps working afterwards.
        sink.state.lock().lie_inactive = false;
        assert!(queue.enqueue(notification("m2", "u2", None)));
        tokio::time::sleep(Duration::from_secs(602)).await;

        assert_eq!(sink.played(), vec!["u2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_start_not_stopped_by_stuck_check() {
        let sink = FakeSink::new(Duration::from_secs(5));
        sink.state.lock().activation_delay = Some(Duration::from_millis(500));
        let queue = ready_queue(Arc::clone(&sink));

        // The sink takes a moment to report active; a single
        // disagreeing stuck tick must not kill the healthy clip.
        assert!(queue.enqueue(notification("m1", "u1", None)));
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(sink.played(), vec!["u1"]);
    }

    #[tokio::test]
    async fn test_playback_rate_clamped() {
        let sink = FakeSink::new(Duration::from_secs(1));
        let queue = AudioQueue::new(AudioQueueConfig::default(), sink);
        assert!((queue.playback_rate() - 1.75).abs() < f64::EPSILON);

        queue.set_playback_rate(0.0);
        assert!((queue.playback_rate() - MIN_PLAYBACK_RATE).abs() < f64::EPSILON);

        queue.set_playback_rate(99.0);
        assert!((queue.playback_rate() - MAX_PLAYBACK_RATE).abs() < f64::EPSILON);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_passed_to_sink() {
        let sink = FakeSink::new(Duration::from_secs(1));
        let queue = ready_queue(Arc::clone(&sink));
        queue.set_playback_rate(2.0);

        assert!(queue.enqueue(notification("m1", "u1", None)));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(sink.loads(), vec![("u1".to_string(), 2.0)]);
    }
}
