//! Feed socket connection state.

use std::time::{Duration, Instant};

use pulsefeed_core::types::ConnectionStatus;
use serde::{Deserialize, Serialize};

/// Connection state for a feed socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    /// Feed is disabled by the user/application toggle.
    Disabled,
    /// Feed is enabled but no connection is active (suspended).
    Idle,
    /// A connect attempt is in progress.
    Connecting,
    /// Connection is established.
    Open,
    /// Waiting out a backoff delay before the next attempt.
    Reconnecting,
    /// The transport is being shut down.
    Closing,
}

impl ConnectionState {
    /// Returns true if the connection is established.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns true if the connection is in a transitional state.
    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        matches!(self, Self::Connecting | Self::Reconnecting)
    }

    /// Returns true if no connection activity is happening.
    #[must_use]
    pub fn is_inactive(&self) -> bool {
        matches!(self, Self::Disabled | Self::Idle | Self::Closing)
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => write!(f, "Disabled"),
            Self::Idle => write!(f, "Idle"),
            Self::Connecting => write!(f, "Connecting"),
            Self::Open => write!(f, "Open"),
            Self::Reconnecting => write!(f, "Reconnecting"),
            Self::Closing => write!(f, "Closing"),
        }
    }
}

/// Internal state tracking for the feed socket.
#[derive(Debug)]
pub(crate) struct SocketState {
    /// Current connection state.
    pub state: ConnectionState,
    /// User/application toggle, independent of transport state.
    pub enabled: bool,
    /// Number of reconnection attempts since the last successful open.
    pub reconnect_attempts: u32,
    /// Last received frame time, used for staleness detection.
    pub last_activity: Option<Instant>,
    /// Last connect attempt time, used for throttling.
    pub last_connect_attempt: Option<Instant>,
}

impl Default for SocketState {
    fn default() -> Self {
        Self {
            state: ConnectionState::Disabled,
            enabled: false,
            reconnect_attempts: 0,
            last_activity: None,
            last_connect_attempt: None,
        }
    }
}

impl SocketState {
    /// Creates a new socket state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the feed as enabled. Idempotent.
    pub fn mark_enabled(&mut self) {
        self.enabled = true;
        if self.state == ConnectionState::Disabled {
            self.state = ConnectionState::Idle;
        }
    }

    /// Marks the feed as disabled. Idempotent.
    pub fn mark_disabled(&mut self) {
        self.enabled = false;
        self.state = ConnectionState::Disabled;
        self.reconnect_attempts = 0;
    }

    /// Marks a connect attempt as started.
    pub fn mark_connecting(&mut self) {
        self.state = ConnectionState::Connecting;
        self.last_connect_attempt = Some(Instant::now());
    }

    /// Marks the connection as open, resetting the backoff state.
    pub fn mark_open(&mut self) {
        self.state = ConnectionState::Open;
        self.reconnect_attempts = 0;
        self.last_activity = Some(Instant::now());
    }

    /// Marks the connection as waiting for a reconnect, incrementing
    /// the attempt counter with wrap-around at `wrap`.
    pub fn mark_reconnecting(&mut self, wrap: u32) {
        self.state = ConnectionState::Reconnecting;
        self.reconnect_attempts = self.reconnect_attempts.wrapping_add(1);
        if wrap > 0 && self.reconnect_attempts >= wrap {
            self.reconnect_attempts = 0;
        }
    }

    /// Marks the transport as shutting down.
    pub fn mark_closing(&mut self) {
        self.state = ConnectionState::Closing;
    }

    /// Marks the feed as idle (enabled, no active connection).
    pub fn mark_idle(&mut self) {
        self.state = if self.enabled {
            ConnectionState::Idle
        } else {
            ConnectionState::Disabled
        };
    }

    /// Records that a frame was received.
    pub fn record_activity(&mut self) {
        self.last_activity = Some(Instant::now());
    }

    /// Returns how much longer the connect throttle requires waiting,
    /// or zero when a new attempt is allowed.
    pub fn connect_throttle_remaining(&self, min_interval: Duration) -> Duration {
        match self.last_connect_attempt {
            Some(at) => min_interval.saturating_sub(at.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Returns true when no frame has arrived within the staleness
    /// window.
    pub fn is_stale(&self, stale_after: Duration) -> bool {
        self.last_activity
            .is_some_and(|at| at.elapsed() > stale_after)
    }

    /// Returns the status snapshot exposed to consumers.
    pub fn status(&self) -> ConnectionStatus {
        ConnectionStatus {
            connected: self.state.is_open(),
            reconnecting: self.state == ConnectionState::Reconnecting
                || (self.state == ConnectionState::Connecting && self.reconnect_attempts > 0),
            enabled: self.enabled,
        }
    }
}
