//! Feed socket configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a reconnecting feed socket.
///
/// Contains connection settings, reconnection policy, and liveness
/// checking parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocketConfig {
    /// Feed endpoint URL.
    pub url: String,

    /// Connection-establish timeout in milliseconds. A connect
    /// attempt exceeding this is abandoned and retried.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Minimum interval between connect attempts in milliseconds
    /// (throttles connection storms).
    #[serde(default = "default_min_connect_interval_ms")]
    pub min_connect_interval_ms: u64,

    /// Initial reconnection delay in milliseconds (backoff floor).
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    /// Maximum reconnection delay in milliseconds (backoff cap).
    #[serde(default = "default_max_reconnect_delay_ms")]
    pub max_reconnect_delay_ms: u64,

    /// Backoff multiplier for exponential backoff.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Exponent ceiling for the backoff calculation; attempts beyond
    /// this reuse the capped exponent.
    #[serde(default = "default_backoff_exponent_ceiling")]
    pub backoff_exponent_ceiling: u32,

    /// Attempt count at which the counter wraps back to zero, so
    /// retries continue indefinitely without overflow.
    #[serde(default = "default_attempt_wrap")]
    pub attempt_wrap: u32,

    /// Jitter added to each delay as a fraction of the capped delay
    /// (0.10 = up to 10%).
    #[serde(default = "default_jitter_fraction")]
    pub jitter_fraction: f64,

    /// Liveness check interval in milliseconds.
    #[serde(default = "default_liveness_interval_ms")]
    pub liveness_interval_ms: u64,

    /// Staleness multiplier: the socket is force-closed when no frame
    /// arrives for `liveness_multiplier` check intervals.
    #[serde(default = "default_liveness_multiplier")]
    pub liveness_multiplier: u32,

    /// Feed identifier for logging (e.g. "messages", "audio").
    #[serde(default)]
    pub feed: String,
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_min_connect_interval_ms() -> u64 {
    4_000
}

fn default_reconnect_delay_ms() -> u64 {
    1_000
}

fn default_max_reconnect_delay_ms() -> u64 {
    30_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_backoff_exponent_ceiling() -> u32 {
    6
}

fn default_attempt_wrap() -> u32 {
    10_000
}

fn default_jitter_fraction() -> f64 {
    0.10
}

fn default_liveness_interval_ms() -> u64 {
    15_000
}

fn default_liveness_multiplier() -> u32 {
    3
}

impl Default for SocketConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            connect_timeout_ms: default_connect_timeout_ms(),
            min_connect_interval_ms: default_min_connect_interval_ms(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            max_reconnect_delay_ms: default_max_reconnect_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            backoff_exponent_ceiling: default_backoff_exponent_ceiling(),
            attempt_wrap: default_attempt_wrap(),
            jitter_fraction: default_jitter_fraction(),
            liveness_interval_ms: default_liveness_interval_ms(),
            liveness_multiplier: default_liveness_multiplier(),
            feed: String::new(),
        }
    }
}

impl SocketConfig {
    /// Creates a new builder for `SocketConfig`.
    #[must_use]
    pub fn builder() -> SocketConfigBuilder {
        SocketConfigBuilder::default()
    }

    /// Returns the connection timeout as a Duration.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Returns the minimum connect interval as a Duration.
    #[must_use]
    pub fn min_connect_interval(&self) -> Duration {
        Duration::from_millis(self.min_connect_interval_ms)
    }

    /// Returns the liveness check interval as a Duration.
    #[must_use]
    pub fn liveness_interval(&self) -> Duration {
        Duration::from_millis(self.liveness_interval_ms)
    }

    /// Returns the idle duration after which the connection is
    /// considered stale and force-closed.
    #[must_use]
    pub fn stale_after(&self) -> Duration {
        Duration::from_millis(self.liveness_interval_ms * u64::from(self.liveness_multiplier))
    }

    /// Calculates the reconnect delay for a given attempt.
    ///
    /// Exponential backoff with a capped exponent and a hard ceiling:
    /// `min(cap, floor * multiplier^min(attempt, ceiling))`, plus a
    /// random jitter of up to `jitter_fraction` of the capped delay.
    #[must_use]
    pub fn reconnect_delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(self.backoff_exponent_ceiling);
        let delay = self.reconnect_delay_ms as f64 * self.backoff_multiplier.powi(exponent as i32);
        let capped = delay.min(self.max_reconnect_delay_ms as f64);
        let jitter = capped * self.jitter_fraction * rand_jitter();
        Duration::from_millis((capped + jitter) as u64)
    }

    /// Wraps an attempt counter so retries continue indefinitely.
    #[must_use]
    pub fn wrap_attempt(&self, attempt: u32) -> u32 {
        if self.attempt_wrap == 0 {
            attempt
        } else {
            attempt % self.attempt_wrap
        }
    }
}

/// Simple pseudo-random jitter (0.0 to 1.0).
fn rand_jitter() -> f64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    f64::from(nanos % 1000) / 1000.0
}

/// Builder for `SocketConfig`.
#[derive(Debug, Default)]
pub struct SocketConfigBuilder {
    url: Option<String>,
    connect_timeout_ms: Option<u64>,
    min_connect_interval_ms: Option<u64>,
    reconnect_delay_ms: Option<u64>,
    max_reconnect_delay_ms: Option<u64>,
    backoff_multiplier: Option<f64>,
    backoff_exponent_ceiling: Option<u32>,
    attempt_wrap: Option<u32>,
    jitter_fraction: Option<f64>,
    liveness_interval_ms: Option<u64>,
    liveness_multiplier: Option<u32>,
    feed: Option<String>,
}

impl SocketConfigBuilder {
    /// Sets the feed endpoint URL.
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the connection-establish timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Sets the minimum interval between connect attempts.
    #[must_use]
    pub fn min_connect_interval(mut self, interval: Duration) -> Self {
        self.min_connect_interval_ms = Some(interval.as_millis() as u64);
        self
    }

    /// Sets the initial reconnection delay.
    #[must_use]
    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay_ms = Some(delay.as_millis() as u64);
        self
    }

    /// Sets the maximum reconnection delay.
    #[must_use]
    pub fn max_reconnect_delay(mut self, delay: Duration) -> Self {
        self.max_reconnect_delay_ms = Some(delay.as_millis() as u64);
        self
    }

    /// Sets the backoff multiplier.
    #[must_use]
    pub fn backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = Some(multiplier);
        self
    }

    /// Sets the backoff exponent ceiling.
    #[must_use]
    pub fn backoff_exponent_ceiling(mut self, ceiling: u32) -> Self {
        self.backoff_exponent_ceiling = Some(ceiling);
        self
    }

    /// Sets the attempt wrap count.
    #[must_use]
    pub fn attempt_wrap(mut self, wrap: u32) -> Self {
        self.attempt_wrap = Some(wrap);
        self
    }

    /// Sets the jitter fraction.
    #[must_use]
    pub fn jitter_fraction(mut self, fraction: f64) -> Self {
        self.jitter_fraction = Some(fraction);
        self
    }

    /// Sets the liveness check interval.
    #[must_use]
    pub fn liveness_interval(mut self, interval: Duration) -> Self {
        self.liveness_interval_ms = Some(interval.as_millis() as u64);
        self
    }

    /// Sets the staleness multiplier.
    #[must_use]
    pub fn liveness_multiplier(mut self, multiplier: u32) -> Self {
        self.liveness_multiplier = Some(multiplier);
        self
    }

    /// Sets the feed identifier used in logs.
    #[must_use]
    pub fn feed(mut self, feed: impl Into<String>) -> Self {
        self.feed = Some(feed.into());
        self
    }

    /// Builds the `SocketConfig`.
    #[must_use]
    pub fn build(self) -> SocketConfig {
        SocketConfig {
            url: self.url.unwrap_or_default(),
            connect_timeout_ms: self
                .connect_timeout_ms
                .unwrap_or_else(default_connect_timeout_ms),
            min_connect_interval_ms: self
                .min_connect_interval_ms
                .unwrap_or_else(default_min_connect_interval_ms),
            reconnect_delay_ms: self
                .reconnect_delay_ms
                .unwrap_or_else(default_reconnect_delay_ms),
            max_reconnect_delay_ms: self
                .max_reconnect_delay_ms
                .unwrap_or_else(default_max_reconnect_delay_ms),
            backoff_multiplier: self
                .backoff_multiplier
                .unwrap_or_else(default_backoff_multiplier),
            backoff_exponent_ceiling: self
                .backoff_exponent_ceiling
                .unwrap_or_else(default_backoff_exponent_ceiling),
            attempt_wrap: self.attempt_wrap.unwrap_or_else(default_attempt_wrap),
            jitter_fraction: self
                .jitter_fraction
                .unwrap_or_else(default_jitter_fraction),
            liveness_interval_ms: self
                .liveness_interval_ms
                .unwrap_or_else(default_liveness_interval_ms),
            liveness_multiplier: self
                .liveness_multiplier
                .unwrap_or_else(default_liveness_multiplier),
            feed: self.feed.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = SocketConfig::builder()
            .url("wss://feed.example.com/ws/messages")
            .feed("messages")
            .connect_timeout(Duration::from_secs(15))
            .max_reconnect_delay(Duration::from_secs(45))
            .build();

        assert_eq!(config.url, "wss://feed.example.com/ws/messages");
        assert_eq!(config.feed, "messages");
        assert_eq!(config.connect_timeout(), Duration::from_secs(15));
        assert_eq!(config.max_reconnect_delay_ms, 45_000);
    }

    #[test]
    fn test_config_defaults() {
        let config = SocketConfig::default();

        assert!(config.url.is_empty());
        assert_eq!(config.connect_timeout_ms, 10_000);
        assert_eq!(config.min_connect_interval_ms, 4_000);
        assert_eq!(config.max_reconnect_delay_ms, 30_000);
        assert_eq!(config.stale_after(), Duration::from_secs(45));
    }

    #[test]
    fn test_backoff_without_jitter_is_exact() {
        let config = SocketConfig::builder()
            .reconnect_delay(Duration::from_secs(1))
            .max_reconnect_delay(Duration::from_secs(30))
            .backoff_multiplier(2.0)
            .jitter_fraction(0.0)
            .build();

        assert_eq!(config.reconnect_delay_for(0), Duration::from_secs(1));
        assert_eq!(config.reconnect_delay_for(1), Duration::from_secs(2));
        assert_eq!(config.reconnect_delay_for(2), Duration::from_secs(4));
        assert_eq!(config.reconnect_delay_for(3), Duration::from_secs(8));
        // Capped at max
        assert_eq!(config.reconnect_delay_for(10), Duration::from_secs(30));
        assert_eq!(config.reconnect_delay_for(9999), Duration::from_secs(30));
    }

    #[test]
    fn test_backoff_monotonic_and_capped_with_jitter() {
        let config = SocketConfig::default();
        let cap_with_jitter =
            Duration::from_millis((config.max_reconnect_delay_ms as f64 * 1.10) as u64 + 1);

        let mut previous_floor = Duration::ZERO;
        for attempt in 0..50 {
            let delay = config.reconnect_delay_for(attempt);
            // The deterministic portion never decreases, so each delay
            // is at least the prior floor minus jitter headroom.
            let exponent = attempt.min(config.backoff_exponent_ceiling);
            let floor = Duration::from_millis(
                (config.reconnect_delay_ms as f64
                    * config.backoff_multiplier.powi(exponent as i32))
                .min(config.max_reconnect_delay_ms as f64) as u64,
            );
            assert!(delay >= floor);
            assert!(floor >= previous_floor);
            assert!(delay <= cap_with_jitter);
            previous_floor = floor;
        }
    }

    #[test]
    fn test_attempt_wrap() {
        let config = SocketConfig::builder().attempt_wrap(5).build();
        assert_eq!(config.wrap_attempt(4), 4);
        assert_eq!(config.wrap_attempt(5), 0);
        assert_eq!(config.wrap_attempt(12), 2);

        let unlimited = SocketConfig::builder().attempt_wrap(0).build();
        assert_eq!(unlimited.wrap_attempt(12), 12);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = SocketConfig::builder()
            .url("wss://feed.example.com")
            .feed("audio")
            .build();

        let json = serde_json::to_string(&config).unwrap();
        let parsed: SocketConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config.url, parsed.url);
        assert_eq!(config.feed, parsed.feed);
        assert_eq!(config.connect_timeout_ms, parsed.connect_timeout_ms);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let parsed: SocketConfig =
            serde_json::from_str(r#"{"url":"wss://feed.example.com"}"#).unwrap();
        assert_eq!(parsed.reconnect_delay_ms, 1_000);
        assert_eq!(parsed.liveness_multiplier, 3);
    }
}
