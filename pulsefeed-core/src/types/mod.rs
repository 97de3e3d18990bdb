//! Core type definitions for feed items and status snapshots.

mod audio;
mod message;
mod status;
mod ticker;

pub use audio::{AudioMetadata, AudioNotification};
pub use message::{DigestKey, Message, MessageKind};
pub use status::{AudioQueueStatus, ConnectionStatus};
pub use ticker::{Ticker, ValidationError};
