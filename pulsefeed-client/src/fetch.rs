//! REST collaborator traits.
//!
//! The embedding application owns the HTTP client, its caching, and
//! authentication; this crate only needs two narrow seams: fetching
//! message snapshots and fetching the audio watchlist. Page order is
//! not guaranteed by the fetcher; the ledger sorts.

use async_trait::async_trait;

use pulsefeed_core::error::FetchError;
use pulsefeed_core::types::{Message, Ticker};

/// Query parameters for a message snapshot fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchQuery {
    /// Skip any application-side cache and hit the origin.
    pub bypass_cache: bool,
    /// Maximum number of messages to return.
    pub limit: Option<usize>,
    /// Opaque pagination cursor from a previous page.
    pub cursor: Option<String>,
    /// Ticker search term; `None` fetches the unfiltered snapshot.
    pub search_term: Option<String>,
}

impl FetchQuery {
    /// Query for a full unfiltered snapshot, bypassing caches. Used
    /// by the polling fallback.
    #[must_use]
    pub fn unfiltered(limit: usize) -> Self {
        Self {
            bypass_cache: true,
            limit: Some(limit),
            cursor: None,
            search_term: None,
        }
    }
}

/// One page of fetched messages.
#[derive(Debug, Clone, Default)]
pub struct MessagePage {
    /// Messages in this page, in no guaranteed order.
    pub messages: Vec<Message>,
    /// Cursor for the next page, when more are available.
    pub next_cursor: Option<String>,
}

/// Message snapshot fetcher.
#[async_trait]
pub trait MessageFetcher: Send + Sync {
    /// Fetches one page of messages.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` when the upstream request fails; callers
    /// must leave their current view untouched on error.
    async fn fetch_messages(&self, query: FetchQuery) -> Result<MessagePage, FetchError>;
}

/// Audio watchlist fetcher.
#[async_trait]
pub trait WatchlistSource: Send + Sync {
    /// Fetches the set of tickers audio notifications are limited to.
    /// An empty list means no restriction.
    ///
    /// # Errors
    ///
    /// Returns `FetchError` when the upstream request fails.
    async fn fetch_watchlist(&self) -> Result<Vec<Ticker>, FetchError>;
}
