//! Book side and its price ordering

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Side of the book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy interest, best (highest) price first
    Bid,
    /// Sell interest, best (lowest) price first
    Ask,
}

impl Side {
    /// Both sides, bids first
    pub const BOTH: [Side; 2] = [Side::Bid, Side::Ask];

    /// Returns the side name as used in feed messages
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bid => "bids",
            Self::Ask => "asks",
        }
    }

    /// Compare two prices in this side's book order.
    ///
    /// `Less` means `a` is the better price and sorts first.
    pub fn cmp_prices(&self, a: f64, b: f64) -> Ordering {
        match self {
            Self::Bid => b.total_cmp(&a),
            Self::Ask => a.total_cmp(&b),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
