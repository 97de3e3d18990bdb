//! Frame and payload decode errors.
//!
//! Malformed inbound frames are dropped with a logged warning; they
//! never propagate and never corrupt the merge or queue state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Decode error for inbound feed frames.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecodeError {
    /// Frame body was not valid JSON.
    #[error("[Decode] Invalid JSON: {reason}")]
    InvalidJson {
        /// Parser error text.
        reason: String,
    },

    /// Frame shape matched none of the known envelopes.
    #[error("[Decode] Unrecognized frame shape: {summary}")]
    UnrecognizedFrame {
        /// Short description of the offending shape.
        summary: String,
    },

    /// Message carried neither `message_id` nor the fallback `id`.
    #[error("[Decode] Message has no usable id")]
    MissingId,

    /// Message timestamp was not a parseable ISO-8601 instant.
    #[error("[Decode] Invalid timestamp: {value}")]
    InvalidTimestamp {
        /// The rejected timestamp text.
        value: String,
    },

    /// Ticker field failed validation.
    #[error("[Decode] Invalid ticker: {value}")]
    InvalidTicker {
        /// The rejected ticker text.
        value: String,
    },
}

impl DecodeError {
    /// Returns the severity level of this error.
    ///
    /// Decode failures are always warnings: the frame is dropped and
    /// the stream continues.
    #[must_use]
    pub fn severity(&self) -> super::ErrorSeverity {
        super::ErrorSeverity::Warning
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_timestamp_display() {
        let error = DecodeError::InvalidTimestamp {
            value: "yesterday".to_string(),
        };
        assert!(error.to_string().contains("yesterday"));
    }

    #[test]
    fn test_decode_errors_are_warnings() {
        assert_eq!(
            DecodeError::MissingId.severity(),
            super::super::ErrorSeverity::Warning
        );
    }
}
