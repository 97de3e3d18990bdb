//! Error types and handling framework.
//!
//! This module provides a hierarchical error type system with
//! domain-specific error categories for the Pulsefeed client:
//!
//! - [`NetworkError`] - transport and connection errors, always
//!   recovered locally via backoff retry
//! - [`DecodeError`] - malformed frames and payloads, dropped with a
//!   logged warning
//! - [`PlaybackError`] - audio load/playback failures, classified so
//!   expected noise never surfaces to the user
//! - [`FetchError`] - opaque upstream REST failures
//!
//! Nothing in the client core throws any of these across its public
//! operation boundary; failure states are represented as status data
//! and logs so the UI layer can render without exception handling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error severity levels for categorizing errors.
///
/// - `Fatal`: unrecoverable, requires attention
/// - `Recoverable`: can be retried or recovered from
/// - `Warning`: non-critical, should be logged
/// - `Info`: expected condition worth noting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ErrorSeverity {
    /// Unrecoverable error requiring immediate attention.
    Fatal,
    /// Error that can be recovered from through retry or fallback.
    #[default]
    Recoverable,
    /// Non-critical issue that should be logged but doesn't prevent
    /// operation.
    Warning,
    /// Informational message about an expected or handled condition.
    Info,
}

impl ErrorSeverity {
    /// Returns true if this error is recoverable (not fatal).
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Fatal)
    }

    /// Returns true if this error is fatal (unrecoverable).
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal)
    }

    /// Returns the severity as a static string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fatal => "FATAL",
            Self::Recoverable => "RECOVERABLE",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

mod decode;
mod fetch;
mod network;
mod playback;

pub use decode::DecodeError;
pub use fetch::FetchError;
pub use network::NetworkError;
pub use playback::PlaybackError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_checks() {
        assert!(ErrorSeverity::Recoverable.is_recoverable());
        assert!(!ErrorSeverity::Fatal.is_recoverable());
        assert!(ErrorSeverity::Fatal.is_fatal());
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(ErrorSeverity::Warning.to_string(), "WARNING");
        assert_eq!(ErrorSeverity::Recoverable.to_string(), "RECOVERABLE");
    }
}
