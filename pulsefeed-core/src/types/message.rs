//! Canonical text-feed message type.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ticker::Ticker;

/// Message kind derived from link presence.
///
/// An earnings announcement carries a link to the source release; an
/// analyst analysis message does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Earnings announcement (has a source link).
    Announcement,
    /// Analyst analysis (no link).
    Analysis,
}

/// A validated text-feed message.
///
/// Instances are produced either by a REST snapshot fetch or by the
/// live socket decoder; the wire-level fallbacks (`message_id` vs `id`,
/// string timestamps) are resolved before this type is constructed.
/// Messages are never mutated after arrival.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Globally unique identifier, the primary deduplication key.
    pub id: String,
    /// Company ticker symbol.
    pub ticker: Ticker,
    /// Event timestamp, used for ordering (descending).
    pub timestamp: DateTime<Utc>,
    /// Optional source link; presence distinguishes announcements
    /// from analysis messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Raw message text, optionally JSON-encoded structured metrics.
    pub payload: String,
}

/// Composite key used by the digest view: one entry per ticker, per
/// calendar day, per message kind.
pub type DigestKey = (Ticker, NaiveDate, MessageKind);

impl Message {
    /// Returns the message kind based on link presence.
    #[must_use]
    pub fn kind(&self) -> MessageKind {
        if self.link.is_some() {
            MessageKind::Announcement
        } else {
            MessageKind::Analysis
        }
    }

    /// Returns the digest grouping key for this message.
    #[must_use]
    pub fn digest_key(&self) -> DigestKey {
        (
            self.ticker.clone(),
            self.timestamp.date_naive(),
            self.kind(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: &str, link: Option<&str>) -> Message {
        Message {
            id: id.to_string(),
            ticker: Ticker::new("AAPL").unwrap(),
            timestamp: "2026-02-03T14:30:00Z".parse().unwrap(),
            link: link.map(String::from),
            payload: "Q1 results".to_string(),
        }
    }

    #[test]
    fn test_kind_from_link_presence() {
        assert_eq!(
            message("m1", Some("https://example.com/8k")).kind(),
            MessageKind::Announcement
        );
        assert_eq!(message("m2", None).kind(), MessageKind::Analysis);
    }

    #[test]
    fn test_digest_key_groups_by_day_and_kind() {
        let a = message("m1", None);
        let mut b = message("m2", None);
        b.timestamp = "2026-02-03T20:00:00Z".parse().unwrap();

        // Same ticker, same day, same kind: same digest group.
        assert_eq!(a.digest_key(), b.digest_key());

        let c = message("m3", Some("https://example.com"));
        assert_ne!(a.digest_key(), c.digest_key());
    }

    #[test]
    fn test_message_serde_roundtrip() {
        let msg = message("m1", Some("https://example.com"));
        let json = serde_json::to_string(&msg).unwrap();
        let parsed: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, parsed);
    }
}
