//! Point-in-time ladder handed to renderers

use depth_types::{DepthRow, Instrument, Side};
use serde::{Deserialize, Serialize};

/// Immutable snapshot of the grouped ladder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthSnapshot {
    /// Instrument the ladder belongs to
    pub instrument: Instrument,
    /// Grouping size the rows were bucketed with
    pub tick_size: f64,
    /// Depth cap in force
    pub max_levels: usize,
    /// Bid rows, highest price first
    pub bids: Vec<DepthRow>,
    /// Ask rows, lowest price first
    pub asks: Vec<DepthRow>,
}

impl Default for DepthSnapshot {
    fn default() -> Self {
        let instrument = Instrument::default();
        Self {
            instrument,
            tick_size: instrument.default_tick().value(),
            max_levels: crate::DEFAULT_MAX_LEVELS,
            bids: Vec::new(),
            asks: Vec::new(),
        }
    }
}

impl DepthSnapshot {
    /// Rows for one side
    pub fn side(&self, side: Side) -> &[DepthRow] {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    /// Check if both sides are empty
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Get the best bid bucket
    pub fn best_bid_price(&self) -> Option<f64> {
        self.bids.first().map(|r| r.price)
    }

    /// Get the best ask bucket
    pub fn best_ask_price(&self) -> Option<f64> {
        self.asks.first().map(|r| r.price)
    }

    /// Get the spread between the best buckets
    pub fn spread(&self) -> Option<f64> {
        Some(self.best_ask_price()? - self.best_bid_price()?)
    }

    /// Get the mid price between the best buckets
    pub fn mid_price(&self) -> Option<f64> {
        Some((self.best_ask_price()? + self.best_bid_price()?) / 2.0)
    }

    /// Deepest running total on either side.
    ///
    /// Scale for [`DepthRow::depth_ratio`] so both sides share one axis.
    pub fn max_total(&self) -> f64 {
        Side::BOTH
            .iter()
            .filter_map(|side| self.side(*side).last())
            .map(|row| row.total)
            .fold(0.0, f64::max)
    }

    /// Largest single bucket size on either side.
    ///
    /// Scale for [`DepthRow::fill_ratio`].
    pub fn max_size(&self) -> f64 {
        self.bids
            .iter()
            .chain(&self.asks)
            .map(|row| row.size)
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_snapshot() -> DepthSnapshot {
        DepthSnapshot {
            bids: vec![DepthRow::new(100.0, 2.0, 2.0), DepthRow::new(99.5, 6.0, 8.0)],
            asks: vec![DepthRow::new(101.0, 1.0, 1.0), DepthRow::new(101.5, 3.0, 4.0)],
            ..DepthSnapshot::default()
        }
    }

    #[test]
    fn test_spread_and_mid() {
        let snapshot = make_snapshot();
        assert_eq!(snapshot.spread(), Some(1.0));
        assert_eq!(snapshot.mid_price(), Some(100.5));
    }

    #[test]
    fn test_scales() {
        let snapshot = make_snapshot();
        assert_eq!(snapshot.max_total(), 8.0);
        assert_eq!(snapshot.max_size(), 6.0);
        assert_eq!(snapshot.bids[1].fill_ratio(snapshot.max_size()), 1.0);
        assert_eq!(snapshot.asks[1].depth_ratio(snapshot.max_total()), 0.5);
    }

    #[test]
    fn test_empty() {
        let snapshot = DepthSnapshot::default();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.spread(), None);
        assert_eq!(snapshot.max_total(), 0.0);
    }

    #[test]
    fn test_serializes_rows_as_triples() {
        let json = serde_json::to_value(make_snapshot()).unwrap();
        assert_eq!(json["instrument"], "PI_XBTUSD");
        assert_eq!(json["asks"][0], serde_json::json!([101.0, 1.0, 1.0]));
    }
}
