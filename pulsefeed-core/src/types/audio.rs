//! Audio notification types.

use serde::{Deserialize, Serialize};

use super::ticker::Ticker;

/// User-facing metadata attached to an audio notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioMetadata {
    /// Company ticker symbol, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<Ticker>,
    /// Company display name, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

/// A real-time audio notification clip.
///
/// `audio_url` is the identity used for duplicate suppression within
/// the pending queue and for already-played suppression across the
/// session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioNotification {
    /// Identifier of the message this clip narrates.
    pub message_id: String,
    /// Clip URL, the deduplication identity.
    pub audio_url: String,
    /// Storage bucket, passed through for diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    /// Storage object key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// MIME content type of the clip.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Clip size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// User-facing metadata.
    #[serde(default)]
    pub metadata: AudioMetadata,
}

impl AudioNotification {
    /// Returns the ticker this clip concerns, when known.
    #[must_use]
    pub fn ticker(&self) -> Option<&Ticker> {
        self.metadata.ticker.as_ref()
    }
}
