//! Network-related error types.
//!
//! These cover socket connection failures, timeouts, and unexpected
//! closures. The feed client recovers from all of them locally via
//! backoff retry; they reach the UI only as connection-status flags.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Network error type covering connection failures, timeouts, and
/// WebSocket transport errors.
///
/// # Examples
///
/// ```
/// use pulsefeed_core::error::NetworkError;
///
/// let error = NetworkError::ConnectionFailed {
///     reason: "Connection refused".to_string(),
/// };
/// assert!(error.to_string().contains("Connection refused"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkError {
    /// Connection to the feed endpoint failed.
    #[error("[Network] Connection failed: {reason}")]
    ConnectionFailed {
        /// Reason for the connection failure.
        reason: String,
    },

    /// Connection attempt exceeded the establish timeout.
    #[error("[Network] Connection timeout after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// WebSocket protocol or transport error.
    #[error("[Network] WebSocket error: {reason}")]
    WebSocket {
        /// Reason for the WebSocket error.
        reason: String,
    },

    /// Connection was closed unexpectedly.
    #[error("[Network] Connection closed: {reason}")]
    ConnectionClosed {
        /// Reason for the connection closure.
        reason: String,
    },

    /// Connection went silent past the liveness window.
    #[error("[Network] Connection stale: no activity for {idle_ms}ms")]
    Stale {
        /// Milliseconds since the last received frame.
        idle_ms: u64,
    },

    /// HTTP-level failure during the WebSocket handshake.
    #[error("[Network] HTTP error: status {status_code} - {reason}")]
    Http {
        /// HTTP status code.
        status_code: u16,
        /// Reason for the HTTP error.
        reason: String,
    },
}

impl NetworkError {
    /// Returns true if this error is recoverable (can be retried).
    ///
    /// Every transport failure the feed client sees is retried while
    /// the feed remains enabled, so this is true for all variants
    /// except client errors from the handshake.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http { status_code, .. } => *status_code >= 500,
            _ => true,
        }
    }

    /// Returns the severity level of this error.
    #[must_use]
    pub fn severity(&self) -> super::ErrorSeverity {
        use super::ErrorSeverity;
        match self {
            Self::Http { status_code, .. } if *status_code < 500 => ErrorSeverity::Warning,
            _ => ErrorSeverity::Recoverable,
        }
    }
}
