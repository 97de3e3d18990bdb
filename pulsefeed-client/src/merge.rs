//! Message merge engine.
//!
//! The ledger folds a live push stream into a fetched snapshot with
//! one invariant set: merging is idempotent by message id, the
//! rendered order is always timestamp-descending with arrival order
//! breaking ties, and a failed or repeated refresh can never corrupt
//! what is already shown. The known-id set is session-wide, so
//! consumers can remount without re-highlighting or duplicating
//! anything.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

use pulsefeed_core::types::{DigestKey, Message};

/// Default duration a freshly arrived message stays highlighted.
pub const DEFAULT_HIGHLIGHT_TTL: Duration = Duration::from_secs(60);

/// Result of offering a live message to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The message was new and is now part of the view.
    Inserted,
    /// The id was already known; nothing changed.
    Duplicate,
    /// An active ticker filter excluded the message; the
    /// outside-filter counter was incremented instead.
    Filtered,
}

struct Entry {
    message: Message,
    /// Arrival sequence, breaks timestamp ties deterministically.
    seq: u64,
}

struct LedgerInner {
    entries: Vec<Entry>,
    known: HashSet<String>,
    highlighted: HashSet<String>,
    highlight_tasks: HashMap<String, JoinHandle<()>>,
    filter: Option<String>,
    pending_outside_filter: usize,
    next_seq: u64,
}

impl LedgerInner {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            known: HashSet::new(),
            highlighted: HashSet::new(),
            highlight_tasks: HashMap::new(),
            filter: None,
            pending_outside_filter: 0,
            next_seq: 0,
        }
    }

    fn insert(&mut self, message: Message) {
        self.known.insert(message.id.clone());
        self.entries.push(Entry {
            message,
            seq: self.next_seq,
        });
        self.next_seq += 1;
    }

    /// Timestamp descending; ties keep arrival order.
    fn resort(&mut self) {
        self.entries.sort_by(|a, b| {
            b.message
                .timestamp
                .cmp(&a.message.timestamp)
                .then(a.seq.cmp(&b.seq))
        });
    }

    fn matches_filter(&self, message: &Message) -> bool {
        match &self.filter {
            Some(term) => message.ticker.as_str().contains(term.as_str()),
            None => true,
        }
    }
}

/// Shared message ledger.
///
/// Cheap to clone; all clones share the same state. Mutations resort
/// the view before returning, so [`messages`](Self::messages) is
/// always render-ready.
#[derive(Clone)]
pub struct MessageLedger {
    inner: Arc<RwLock<LedgerInner>>,
    highlight_ttl: Duration,
}

impl Default for MessageLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageLedger {
    /// Creates an empty ledger with the default highlight window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_highlight_ttl(DEFAULT_HIGHLIGHT_TTL)
    }

    /// Creates an empty ledger with a custom highlight window.
    #[must_use]
    pub fn with_highlight_ttl(highlight_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(LedgerInner::new())),
            highlight_ttl,
        }
    }

    /// Replaces the baseline with a fetched snapshot.
    ///
    /// The known-id set only grows: ids from previous sessions of the
    /// view stay deduplicated even when the new snapshot no longer
    /// contains them. Highlights on ids still present survive the
    /// replace.
    pub fn apply_snapshot(&self, messages: Vec<Message>) {
        let mut inner = self.inner.write();
        inner.entries.clear();
        // Overlapping pages can repeat an id within one snapshot; the
        // first copy wins so the rendered view stays unique by id.
        let mut seen: HashSet<String> = HashSet::new();
        for message in messages {
            if !seen.insert(message.id.clone()) {
                continue;
            }
            inner.insert(message);
        }
        inner.resort();
        debug!(count = inner.entries.len(), "Applied snapshot baseline");
    }

    /// Reconciles a refreshed snapshot into the existing view.
    ///
    /// Only ids unknown to the session are inserted; everything
    /// already present is left alone, so a refresh can never remove
    /// or reorder what is shown. Returns the number of inserted
    /// messages. Ids genuinely new to the session are highlighted.
    pub fn merge_snapshot(&self, messages: Vec<Message>) -> usize {
        let mut fresh_ids = Vec::new();
        {
            let mut inner = self.inner.write();
            for message in messages {
                if inner.known.contains(&message.id) {
                    continue;
                }
                if !inner.matches_filter(&message) {
                    continue;
                }
                fresh_ids.push(message.id.clone());
                inner.insert(message);
            }
            if !fresh_ids.is_empty() {
                inner.resort();
            }
        }
        if !fresh_ids.is_empty() {
            debug!(count = fresh_ids.len(), "Snapshot merge found missed messages");
        }
        for id in &fresh_ids {
            self.start_highlight(id.clone());
        }
        fresh_ids.len()
    }

    /// Offers a live-pushed message to the ledger.
    ///
    /// Duplicates are silent no-ops. When an active ticker filter
    /// excludes the message it is counted, not stored, and its id is
    /// deliberately not recorded: the next unfiltered fetch picks it
    /// up as new.
    pub fn push_live(&self, message: Message) -> PushOutcome {
        let id = message.id.clone();
        {
            let mut inner = self.inner.write();
            if inner.known.contains(&id) {
                return PushOutcome::Duplicate;
            }
            if !inner.matches_filter(&message) {
                inner.pending_outside_filter += 1;
                debug!(
                    id = %id,
                    ticker = %message.ticker,
                    pending = inner.pending_outside_filter,
                    "Live message outside active filter"
                );
                return PushOutcome::Filtered;
            }
            inner.insert(message);
            inner.resort();
        }
        self.start_highlight(id);
        PushOutcome::Inserted
    }

    /// Returns the full rendered view, timestamp descending.
    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.inner
            .read()
            .entries
            .iter()
            .map(|e| e.message.clone())
            .collect()
    }

    /// Returns the digest view: one message per
    /// `(ticker, date, link presence)` group, keeping the earliest
    /// of each group, ordered timestamp descending overall.
    #[must_use]
    pub fn digest(&self) -> Vec<Message> {
        let inner = self.inner.read();
        let mut seen: HashSet<DigestKey> = HashSet::new();
        let mut picked: Vec<&Entry> = Vec::new();
        // Entries are sorted descending; walking in reverse visits
        // the earliest of each group first.
        for entry in inner.entries.iter().rev() {
            if seen.insert(entry.message.digest_key()) {
                picked.push(entry);
            }
        }
        picked.reverse();
        picked.into_iter().map(|e| e.message.clone()).collect()
    }

    /// Sets or clears the active ticker filter. The term is
    /// normalized to uppercase; an empty term clears the filter.
    /// Changing the filter resets the outside-filter counter.
    pub fn set_search_filter(&self, term: Option<String>) {
        let mut inner = self.inner.write();
        inner.filter = term
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty());
        inner.pending_outside_filter = 0;
    }

    /// Returns the active filter term, if any.
    #[must_use]
    pub fn search_filter(&self) -> Option<String> {
        self.inner.read().filter.clone()
    }

    /// Returns how many live messages arrived outside the active
    /// filter since it was set.
    #[must_use]
    pub fn pending_outside_filter(&self) -> usize {
        self.inner.read().pending_outside_filter
    }

    /// Returns the currently highlighted ids.
    #[must_use]
    pub fn new_ids(&self) -> HashSet<String> {
        self.inner.read().highlighted.clone()
    }

    /// Returns whether the given id is within its highlight window.
    #[must_use]
    pub fn is_highlighted(&self, id: &str) -> bool {
        self.inner.read().highlighted.contains(id)
    }

    /// Returns the number of messages in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Returns whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// Resets the ledger to its initial state: the view, the known-id
    /// set, all highlights, the active filter, and the outside-filter
    /// counter.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.entries.clear();
        inner.known.clear();
        inner.highlighted.clear();
        inner.filter = None;
        inner.pending_outside_filter = 0;
        for (_, task) in inner.highlight_tasks.drain() {
            task.abort();
        }
    }

    /// Highlights an id for the configured window via a one-shot
    /// timer. Re-highlighting restarts the window.
    fn start_highlight(&self, id: String) {
        let mut inner = self.inner.write();
        inner.highlighted.insert(id.clone());
        if let Some(previous) = inner.highlight_tasks.remove(&id) {
            previous.abort();
        }
        let shared = Arc::clone(&self.inner);
        let ttl = self.highlight_ttl;
        let task_id = id.clone();
        inner.highlight_tasks.insert(
            id,
            tokio::spawn(async move {
                tokio::time::sleep(ttl).await;
                let mut inner = shared.write();
                inner.highlighted.remove(&task_id);
                inner.highlight_tasks.remove(&task_id);
            }),
        );
    }
}
