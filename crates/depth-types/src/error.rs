//! Error types for the depth book engine

use crate::{Instrument, Side};
use thiserror::Error;

/// Main error type for book operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookError {
    // === Validation Errors ===
    /// A delta entry could not be used and was skipped
    #[error("Malformed {side} entry #{index} {entry}: {reason}")]
    MalformedLevel {
        side: Side,
        /// Position of the entry within its side of the page
        index: usize,
        /// The offending entry as received
        entry: String,
        reason: &'static str,
    },

    /// Requested grouping size is not offered for the instrument
    #[error("Tick size {tick} is not offered for {instrument} (allowed: {allowed:?})")]
    InvalidTickSize {
        instrument: Instrument,
        tick: f64,
        allowed: &'static [f64],
    },

    // === Consistency Errors ===
    /// A grouped bucket no longer matches the raw levels it aggregates
    #[error("Aggregate mismatch on {side} bucket {bucket}: expected {expected}, found {actual}")]
    Consistency {
        side: Side,
        bucket: f64,
        expected: f64,
        actual: f64,
    },

    // === Internal Errors ===
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl BookError {
    /// Returns true if the error rejects a single input and leaves state untouched
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MalformedLevel { .. } | Self::InvalidTickSize { .. }
        )
    }

    /// Returns true if the error reports a broken aggregation invariant
    pub fn is_consistency(&self) -> bool {
        matches!(self, Self::Consistency { .. })
    }

    /// Create a malformed level error
    pub fn malformed(
        side: Side,
        index: usize,
        entry: impl Into<String>,
        reason: &'static str,
    ) -> Self {
        Self::MalformedLevel {
            side,
            index,
            entry: entry.into(),
            reason,
        }
    }
}

/// Result type alias for book operations
pub type BookResult<T> = Result<T, BookError>;
