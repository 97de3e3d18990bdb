//! Upstream REST fetch errors.
//!
//! The REST layer is an opaque collaborator; its failures carry a
//! status and reason but are otherwise uninterpreted. The client's
//! only contract is that a failed fetch never clears or corrupts the
//! already-rendered snapshot.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque upstream REST failure.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchError {
    /// The endpoint answered with a non-success status.
    #[error("[Fetch] Upstream returned status {status_code}: {reason}")]
    Status {
        /// HTTP status code.
        status_code: u16,
        /// Response body or reason phrase.
        reason: String,
    },

    /// The request never completed.
    #[error("[Fetch] Request failed: {reason}")]
    Request {
        /// Reason for the failure.
        reason: String,
    },

    /// The response body could not be interpreted.
    #[error("[Fetch] Malformed response: {reason}")]
    MalformedResponse {
        /// Reason for the decode failure.
        reason: String,
    },
}

impl FetchError {
    /// Returns the severity level of this error.
    #[must_use]
    pub fn severity(&self) -> super::ErrorSeverity {
        use super::ErrorSeverity;
        match self {
            Self::Status { status_code, .. } if *status_code < 500 => ErrorSeverity::Warning,
            _ => ErrorSeverity::Recoverable,
        }
    }
}
