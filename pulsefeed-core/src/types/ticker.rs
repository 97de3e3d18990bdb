//! Ticker symbol newtype.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Validation error for core types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Ticker string was empty.
    #[error("Ticker symbol cannot be empty")]
    EmptyTicker,

    /// Ticker contained invalid characters.
    #[error("Invalid ticker symbol: {0}")]
    InvalidTicker(String),
}

/// A company ticker symbol (e.g. "AAPL").
///
/// Stored uppercased; comparison is case-insensitive at construction.
///
/// # Examples
///
/// ```
/// use pulsefeed_core::types::Ticker;
///
/// let ticker = Ticker::new("aapl").unwrap();
/// assert_eq!(ticker.as_str(), "AAPL");
/// assert!(Ticker::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    /// Creates a new `Ticker` from a string.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyTicker` if the string is empty.
    /// Returns `ValidationError::InvalidTicker` if the format is invalid.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        if s.is_empty() {
            return Err(ValidationError::EmptyTicker);
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return Err(ValidationError::InvalidTicker(s));
        }
        Ok(Self(s.to_ascii_uppercase()))
    }

    /// Creates a new `Ticker` without validation.
    ///
    /// The caller must ensure the value is a valid ticker format.
    #[must_use]
    pub fn new_unchecked(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the ticker as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
