//! Status snapshots exposed to the UI layer.

use serde::{Deserialize, Serialize};

use super::audio::AudioNotification;

/// Connection status for one feed, as rendered by the UI.
///
/// Transport failures are never surfaced as errors; this snapshot is
/// the only observable effect of connection trouble.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    /// Whether the socket is currently open.
    pub connected: bool,
    /// Whether a reconnect attempt is scheduled or in progress.
    pub reconnecting: bool,
    /// The user/application toggle, independent of transport state.
    pub enabled: bool,
}

/// Audio queue status, as rendered by the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioQueueStatus {
    /// The clip currently playing, if any.
    pub currently_playing: Option<AudioNotification>,
    /// Number of clips waiting behind the current one.
    pub queue_depth: usize,
    /// The user/application toggle.
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_status_default() {
        let status = ConnectionStatus::default();
        assert!(!status.connected);
        assert!(!status.reconnecting);
        assert!(!status.enabled);
    }

    #[test]
    fn test_status_serde_roundtrip() {
        let status = ConnectionStatus {
            connected: true,
            reconnecting: false,
            enabled: true,
        };
        let json = serde_json::to_string(&status).unwrap();
        let parsed: ConnectionStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status, parsed);
    }
}
