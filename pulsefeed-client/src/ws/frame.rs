//! Inbound frame decoding.
//!
//! All inbound frames are decoded at the boundary into one canonical
//! tagged union, [`FeedFrame`]. The message feed delivers enveloped
//! frames (`{"type": "new_message", "data": {...}}`); the audio feed
//! delivers either the same envelope shape (`"new_audio"`) or a bare
//! payload, both normalized here. Unrecognized shapes are a
//! [`DecodeError`], dropped and logged by the caller, never silently
//! branched on.

use chrono::{DateTime, Utc};
use pulsefeed_core::error::DecodeError;
use pulsefeed_core::types::{AudioNotification, Message, Ticker};
use serde::Deserialize;
use serde_json::Value;

/// Which logical feed a socket carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    /// Text message feed.
    Messages,
    /// Audio notification feed.
    Audio,
}

impl std::fmt::Display for FeedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Messages => write!(f, "messages"),
            Self::Audio => write!(f, "audio"),
        }
    }
}

/// A decoded inbound frame.
#[derive(Debug, Clone)]
pub enum FeedFrame {
    /// A text-feed message.
    Message(Message),
    /// An audio notification.
    Audio(AudioNotification),
}

impl FeedFrame {
    /// Decodes a raw text frame from the given feed.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` for malformed JSON, unrecognized frame
    /// shapes, missing ids, or unparseable timestamps.
    pub fn decode(kind: FeedKind, text: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(text).map_err(|e| DecodeError::InvalidJson {
            reason: e.to_string(),
        })?;

        match kind {
            FeedKind::Messages => decode_message_frame(&value).map(Self::Message),
            FeedKind::Audio => decode_audio_frame(&value).map(Self::Audio),
        }
    }
}

/// Wire shape of a text-feed message, before validation.
#[derive(Debug, Deserialize)]
struct WireMessage {
    #[serde(default)]
    message_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    ticker: String,
    timestamp: String,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    payload: String,
}

impl WireMessage {
    /// Normalizes the wire shape into the canonical [`Message`].
    fn normalize(self) -> Result<Message, DecodeError> {
        let id = self
            .message_id
            .filter(|s| !s.is_empty())
            .or(self.id.filter(|s| !s.is_empty()))
            .ok_or(DecodeError::MissingId)?;

        let ticker = Ticker::new(&self.ticker).map_err(|_| DecodeError::InvalidTicker {
            value: self.ticker.clone(),
        })?;

        let timestamp: DateTime<Utc> = DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| DecodeError::InvalidTimestamp {
                value: self.timestamp.clone(),
            })?;

        Ok(Message {
            id,
            ticker,
            timestamp,
            link: self.link.filter(|s| !s.is_empty()),
            payload: self.payload,
        })
    }
}

fn decode_message_frame(value: &Value) -> Result<Message, DecodeError> {
    let (kind, data) = split_envelope(value)?;
    if kind != "new_message" {
        return Err(DecodeError::UnrecognizedFrame {
            summary: format!("unexpected type \"{kind}\" on message feed"),
        });
    }

    let wire: WireMessage =
        serde_json::from_value(data.clone()).map_err(|e| DecodeError::InvalidJson {
            reason: e.to_string(),
        })?;
    wire.normalize()
}

fn decode_audio_frame(value: &Value) -> Result<AudioNotification, DecodeError> {
    // Enveloped form takes priority; a bare payload is identified by
    // its audio_url field.
    let data = match value.get("type") {
        Some(Value::String(kind)) if kind == "new_audio" => {
            value.get("data").ok_or(DecodeError::UnrecognizedFrame {
                summary: "new_audio envelope without data".to_string(),
            })?
        }
        Some(Value::String(kind)) => {
            return Err(DecodeError::UnrecognizedFrame {
                summary: format!("unexpected type \"{kind}\" on audio feed"),
            });
        }
        _ if value.get("audio_url").is_some() => value,
        _ => {
            return Err(DecodeError::UnrecognizedFrame {
                summary: "audio frame with neither envelope nor audio_url".to_string(),
            });
        }
    };

    serde_json::from_value(data.clone()).map_err(|e| DecodeError::InvalidJson {
        reason: e.to_string(),
    })
}

fn split_envelope(value: &Value) -> Result<(&str, &Value), DecodeError> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or(DecodeError::UnrecognizedFrame {
            summary: "frame without a type tag".to_string(),
        })?;
    let data = value.get("data").ok_or(DecodeError::UnrecognizedFrame {
        summary: format!("\"{kind}\" envelope without data"),
    })?;
    Ok((kind, data))
}
