//! Incremental book updates

use crate::{Level, Side};
use serde::{Deserialize, Serialize};

/// One delta for either or both sides of the book.
///
/// JSON shape: `{"bids": [[price, size], ...], "asks": [[price, size], ...]}`.
/// A missing side leaves that side untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookPage {
    /// Bid updates, applied in order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bids: Option<Vec<Level>>,
    /// Ask updates, applied in order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asks: Option<Vec<Level>>,
}

impl BookPage {
    /// Create an empty page
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bid updates
    pub fn with_bids(mut self, levels: impl IntoIterator<Item = (f64, f64)>) -> Self {
        self.bids = Some(levels.into_iter().map(Level::from).collect());
        self
    }

    /// Set the ask updates
    pub fn with_asks(mut self, levels: impl IntoIterator<Item = (f64, f64)>) -> Self {
        self.asks = Some(levels.into_iter().map(Level::from).collect());
        self
    }

    /// Updates for one side, if present
    pub fn side(&self, side: Side) -> Option<&[Level]> {
        match side {
            Side::Bid => self.bids.as_deref(),
            Side::Ask => self.asks.as_deref(),
        }
    }

    /// Total number of entries across both sides
    pub fn len(&self) -> usize {
        Side::BOTH
            .iter()
            .map(|side| self.side(*side).map_or(0, <[Level]>::len))
            .sum()
    }

    /// Check if the page carries no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
