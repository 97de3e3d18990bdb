//! Feed endpoint configuration.
//!
//! Endpoint URLs are opaque strings supplied by deployment
//! configuration; environment variables override file/default values.

use serde::{Deserialize, Serialize};

/// Environment variable overriding the message feed WebSocket URL.
pub const ENV_MESSAGE_WS_URL: &str = "PULSEFEED_MESSAGE_WS_URL";
/// Environment variable overriding the audio feed WebSocket URL.
pub const ENV_AUDIO_WS_URL: &str = "PULSEFEED_AUDIO_WS_URL";
/// Environment variable overriding the REST base URL.
pub const ENV_REST_BASE_URL: &str = "PULSEFEED_REST_BASE_URL";

/// Endpoints for the two real-time feeds and the REST snapshot API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEndpoints {
    /// WebSocket URL for the text message feed.
    #[serde(default = "default_message_ws_url")]
    pub message_ws_url: String,

    /// WebSocket URL for the audio notification feed.
    #[serde(default = "default_audio_ws_url")]
    pub audio_ws_url: String,

    /// Base URL for the REST snapshot API.
    #[serde(default = "default_rest_base_url")]
    pub rest_base_url: String,
}

fn default_message_ws_url() -> String {
    "wss://localhost:8443/ws/messages".to_string()
}

fn default_audio_ws_url() -> String {
    "wss://localhost:8443/ws/audio".to_string()
}

fn default_rest_base_url() -> String {
    "https://localhost:8443/api".to_string()
}

impl Default for FeedEndpoints {
    fn default() -> Self {
        Self {
            message_ws_url: default_message_ws_url(),
            audio_ws_url: default_audio_ws_url(),
            rest_base_url: default_rest_base_url(),
        }
    }
}

impl FeedEndpoints {
    /// Applies environment variable overrides to this configuration.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(ENV_MESSAGE_WS_URL) {
            self.message_ws_url = url;
        }
        if let Ok(url) = std::env::var(ENV_AUDIO_WS_URL) {
            self.audio_ws_url = url;
        }
        if let Ok(url) = std::env::var(ENV_REST_BASE_URL) {
            self.rest_base_url = url;
        }
        self
    }

    /// Loads defaults with environment overrides applied.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let endpoints = FeedEndpoints::default();
        assert!(endpoints.message_ws_url.starts_with("wss://"));
        assert!(endpoints.audio_ws_url.starts_with("wss://"));
        assert!(endpoints.rest_base_url.starts_with("https://"));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let parsed: FeedEndpoints =
            serde_json::from_str(r#"{"message_ws_url":"wss://feed.example.com/messages"}"#)
                .unwrap();
        assert_eq!(parsed.message_ws_url, "wss://feed.example.com/messages");
        assert_eq!(parsed.audio_ws_url, default_audio_ws_url());
    }

    #[test]
    fn test_serde_roundtrip() {
        let endpoints = FeedEndpoints::default();
        let json = serde_json::to_string(&endpoints).unwrap();
        let parsed: FeedEndpoints = serde_json::from_str(&json).unwrap();
        assert_eq!(endpoints, parsed);
    }
}
