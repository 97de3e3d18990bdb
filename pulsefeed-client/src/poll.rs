//! Polling fallback.
//!
//! Live pushes can be missed during reconnect gaps. The poller
//! periodically re-fetches the unfiltered snapshot and reconciles it
//! through the ledger's merge path, whose idempotence makes the
//! overlap between pushed and polled copies harmless. It never runs
//! before the first snapshot is in place and never overlaps its own
//! fetches.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use crate::fetch::{FetchQuery, MessageFetcher};
use crate::merge::MessageLedger;

/// Configuration for the snapshot poller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Poll interval (humantime format in config files, e.g. "3s").
    #[serde(with = "humantime_serde", default = "default_poll_interval")]
    pub poll_interval: Duration,

    /// Page size requested per poll.
    #[serde(default = "default_page_limit")]
    pub page_limit: usize,
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(3)
}

fn default_page_limit() -> usize {
    50
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            page_limit: default_page_limit(),
        }
    }
}

/// Periodic snapshot reconciler.
pub struct SnapshotPoller {
    config: PollerConfig,
    fetcher: Arc<dyn MessageFetcher>,
    ledger: MessageLedger,
    in_flight: Arc<AtomicBool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SnapshotPoller {
    /// Creates a poller over the given fetcher and ledger. Nothing
    /// runs until [`start`](Self::start).
    #[must_use]
    pub fn new(config: PollerConfig, fetcher: Arc<dyn MessageFetcher>, ledger: MessageLedger) -> Self {
        Self {
            config,
            fetcher,
            ledger,
            in_flight: Arc::new(AtomicBool::new(false)),
            task: Mutex::new(None),
        }
    }

    /// Starts the poll loop. Idempotent.
    pub fn start(&self) {
        let mut slot = self.task.lock();
        if slot.as_ref().is_some_and(|t| !t.is_finished()) {
            return;
        }
        *slot = Some(tokio::spawn(poll_loop(
            self.config.clone(),
            Arc::clone(&self.fetcher),
            self.ledger.clone(),
            Arc::clone(&self.in_flight),
        )));
        debug!(
            interval_ms = self.config.poll_interval.as_millis() as u64,
            "Snapshot poller started"
        );
    }

    /// Stops the poll loop.
    pub fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
            debug!("Snapshot poller stopped");
        }
    }

    /// Returns whether the poll loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.lock().as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for SnapshotPoller {
    fn drop(&mut self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }
}

async fn poll_loop(
    config: PollerConfig,
    fetcher: Arc<dyn MessageFetcher>,
    ledger: MessageLedger,
    in_flight: Arc<AtomicBool>,
) {
    let mut ticker = interval(config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The immediate first tick would race the initial snapshot fetch.
    ticker.tick().await;

    loop {
        ticker.tick().await;

        // Wait for the initial snapshot; reconciling into an empty
        // ledger would promote the poller to primary data source.
        if ledger.is_empty() {
            continue;
        }
        if in_flight.swap(true, Ordering::AcqRel) {
            debug!("Previous poll still in flight, skipping tick");
            continue;
        }

        let query = FetchQuery::unfiltered(config.page_limit);
        match fetcher.fetch_messages(query).await {
            Ok(page) => {
                let inserted = ledger.merge_snapshot(page.messages);
                if inserted > 0 {
                    debug!(inserted = inserted, "Poll reconciled missed messages");
                }
            }
            Err(error) => {
                // The ledger stays untouched; the next tick retries.
                warn!(error = %error, "Snapshot poll failed");
            }
        }
        in_flight.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use pulsefeed_core::error::FetchError;
    use pulsefeed_core::types::{Message, Ticker};

    use crate::fetch::MessagePage;

    fn msg(id: &str, secs: i64) -> Message {
        Message {
            id: id.to_string(),
            ticker: Ticker::new("AAPL").unwrap(),
            timestamp: Utc.timestamp_opt(1_770_000_000 + secs, 0).unwrap(),
            link: None,
            payload: String::new(),
        }
    }

    struct FakeFetcher {
        pages: Mutex<Vec<Result<MessagePage, FetchError>>>,
        call_count: std::sync::atomic::AtomicUsize,
    }

    impl FakeFetcher {
        fn new(pages: Vec<Result<MessagePage, FetchError>>) -> Arc<Self> {
            Arc::new(Self {
                pages: Mutex::new(pages),
                call_count: std::sync::atomic::AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MessageFetcher for FakeFetcher {
        async fn fetch_messages(&self, query: FetchQuery) -> Result<MessagePage, FetchError> {
            assert!(query.bypass_cache);
            assert!(query.search_term.is_none());
            self.call_count.fetch_add(1, Ordering::SeqCst);
            let mut pages = self.pages.lock();
            if pages.is_empty() {
                Ok(MessagePage::default())
            } else {
                pages.remove(0)
            }
        }
    }

    #[test]
    fn test_poller_config_humantime() {
        let config: PollerConfig = serde_json::from_str(r#"{"poll_interval":"5s"}"#).unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.page_limit, 50);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_skips_empty_ledger() {
        let fetcher = FakeFetcher::new(vec![]);
        let ledger = MessageLedger::new();
        let poller = SnapshotPoller::new(PollerConfig::default(), Arc::clone(&fetcher) as _, ledger);
        poller.start();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(fetcher.call_count(), 0);
        poller.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_poller_reconciles_missed_messages() {
        let fetcher = FakeFetcher::new(vec![Ok(MessagePage {
            messages: vec![msg("a", 0), msg("missed", 5)],
            next_cursor: None,
        })]);
        let ledger = MessageLedger::new();
        ledger.apply_snapshot(vec![msg("a", 0)]);

        let poller = SnapshotPoller::new(
            PollerConfig::default(),
            Arc::clone(&fetcher) as _,
            ledger.clone(),
        );
        poller.start();

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(ledger.len(), 2);
        assert!(ledger.messages().iter().any(|m| m.id == "missed"));
        poller.stop();
        assert!(!poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_leaves_ledger_untouched() {
        let fetcher = FakeFetcher::new(vec![
            Err(FetchError::Status {
                status_code: 502,
                reason: "bad gateway".to_string(),
            }),
            Ok(MessagePage {
                messages: vec![msg("a", 0), msg("b", 5)],
                next_cursor: None,
            }),
        ]);
        let ledger = MessageLedger::new();
        ledger.apply_snapshot(vec![msg("a", 0)]);

        let poller = SnapshotPoller::new(
            PollerConfig::default(),
            Arc::clone(&fetcher) as _,
            ledger.clone(),
        );
        poller.start();

        // First tick fails: nothing changes.
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(ledger.len(), 1);

        // Next tick recovers.
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(ledger.len(), 2);
        poller.stop();
    }
}
