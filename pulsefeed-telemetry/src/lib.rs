//! Structured logging initialization for pulsefeed.
//!
//! Thin wrapper around `tracing-subscriber`: a serde-friendly
//! [`LogConfig`] selects level, format (JSON or human-readable), and
//! outputs (stdout and/or rotating files), and [`init_logging`] wires
//! it all up once at startup.

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod logging;

pub use logging::{init_logging, LogConfig, LogFormat, LogOutput, RotationPolicy, TelemetryError};
