//! Audio playback error types.
//!
//! Playback failures are classified so that expected noise (aborts
//! during rapid source swaps) never surfaces to the user, while an
//! autoplay block produces exactly one interaction hint.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Audio load/playback error.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackError {
    /// The playback sink refused to start without a prior user
    /// gesture (browser autoplay policy).
    #[error("[Playback] Autoplay blocked, user interaction required")]
    AutoplayBlocked,

    /// The current source was replaced before it finished loading or
    /// playing. Expected during rapid source swaps.
    #[error("[Playback] Load aborted")]
    Aborted,

    /// The clip did not become playable within the load timeout.
    #[error("[Playback] Load timeout after {timeout_ms}ms")]
    LoadTimeout {
        /// Timeout duration in milliseconds.
        timeout_ms: u64,
    },

    /// The media itself failed to decode or stream.
    #[error("[Playback] Media error: {reason}")]
    Media {
        /// Reason for the media failure.
        reason: String,
    },

    /// The playback sink failed for an unrelated reason.
    #[error("[Playback] Sink error: {reason}")]
    Sink {
        /// Reason for the sink failure.
        reason: String,
    },
}

impl PlaybackError {
    /// Returns true for errors that are expected operational noise
    /// and must not surface as user-facing failures.
    #[must_use]
    pub fn is_expected_noise(&self) -> bool {
        matches!(self, Self::Aborted)
    }

    /// Returns true if this error should surface a one-time
    /// "interaction required" hint to the user.
    #[must_use]
    pub fn needs_interaction_hint(&self) -> bool {
        matches!(self, Self::AutoplayBlocked)
    }

    /// Returns the severity level of this error.
    #[must_use]
    pub fn severity(&self) -> super::ErrorSeverity {
        use super::ErrorSeverity;
        match self {
            Self::Aborted => ErrorSeverity::Info,
            Self::AutoplayBlocked => ErrorSeverity::Warning,
            Self::LoadTimeout { .. } | Self::Media { .. } | Self::Sink { .. } => {
                ErrorSeverity::Recoverable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aborted_is_noise() {
        assert!(PlaybackError::Aborted.is_expected_noise());
        assert!(!PlaybackError::AutoplayBlocked.is_expected_noise());
    }

    #[test]
    fn test_autoplay_needs_hint() {
        assert!(PlaybackError::AutoplayBlocked.needs_interaction_hint());
        assert!(!PlaybackError::Aborted.needs_interaction_hint());
        assert!(!PlaybackError::LoadTimeout { timeout_ms: 10_000 }.needs_interaction_hint());
    }

    #[test]
    fn test_severity_classification() {
        use super::super::ErrorSeverity;
        assert_eq!(PlaybackError::Aborted.severity(), ErrorSeverity::Info);
        assert_eq!(
            PlaybackError::Media {
                reason: "bad codec".to_string()
            }
            .severity(),
            ErrorSeverity::Recoverable
        );
    }
}
