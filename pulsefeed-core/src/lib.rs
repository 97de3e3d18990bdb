//! # Pulsefeed Core
//!
//! Core types, errors, and configuration for the Pulsefeed earnings-feed
//! client.
//!
//! This crate provides:
//! - Canonical feed item types (`Message`, `AudioNotification`, `Ticker`)
//! - Connection and audio-queue status snapshots exposed to the UI layer
//! - Error types and handling framework
//! - Feed endpoint configuration with environment variable overrides

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_const_for_fn)]

/// Core type definitions
pub mod types;

/// Error types and handling
pub mod error;

/// Feed endpoint configuration
pub mod config;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::error::*;
    pub use crate::types::*;
}
