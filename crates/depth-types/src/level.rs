//! Price level types
//!
//! Prices and sizes are plain `f64`. On the wire both [`Level`] and
//! [`DepthRow`] are positional JSON arrays, `[price, size]` and
//! `[price, size, total]`.

use serde::{Deserialize, Serialize};

/// A single `(price, size)` entry of a book delta
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Level {
    /// Price of this level
    pub price: f64,
    /// Size at this price; zero means delete
    pub size: f64,
}

impl Level {
    /// Create a new price level
    pub fn new(price: f64, size: f64) -> Self {
        Self { price, size }
    }

    /// Check if this level is a delete sentinel
    pub fn is_delete(&self) -> bool {
        self.size == 0.0
    }

    /// Check that price and size are finite and non-negative.
    ///
    /// Returns the reason on failure.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.price.is_finite() {
            return Err("price is not a finite number");
        }
        if !self.size.is_finite() {
            return Err("size is not a finite number");
        }
        if self.price < 0.0 {
            return Err("price is negative");
        }
        if self.size < 0.0 {
            return Err("size is negative");
        }
        Ok(())
    }
}

impl From<(f64, f64)> for Level {
    fn from((price, size): (f64, f64)) -> Self {
        Self { price, size }
    }
}

impl From<Level> for (f64, f64) {
    fn from(level: Level) -> Self {
        (level.price, level.size)
    }
}

/// A grouped row of the ladder as handed to a renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64, f64)", into = "(f64, f64, f64)")]
pub struct DepthRow {
    /// Bucket price
    pub price: f64,
    /// Aggregated size in the bucket
    pub size: f64,
    /// Running total from the best bucket through this one
    pub total: f64,
}

impl DepthRow {
    /// Create a new row
    pub fn new(price: f64, size: f64, total: f64) -> Self {
        Self { price, size, total }
    }

    /// Bar fill for this row's size against the largest size in view, in `[0, 1]`
    pub fn fill_ratio(&self, max_size_in_view: f64) -> f64 {
        ratio(self.size, max_size_in_view)
    }

    /// Bar fill for this row's running total against the deepest total, in `[0, 1]`
    pub fn depth_ratio(&self, max_total: f64) -> f64 {
        ratio(self.total, max_total)
    }
}

fn ratio(value: f64, max: f64) -> f64 {
    if max > 0.0 && max.is_finite() {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

impl From<(f64, f64, f64)> for DepthRow {
    fn from((price, size, total): (f64, f64, f64)) -> Self {
        Self { price, size, total }
    }
}

impl From<DepthRow> for (f64, f64, f64) {
    fn from(row: DepthRow) -> Self {
        (row.price, row.size, row.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_json_array() {
        let level: Level = serde_json::from_str("[88813.5, 0.25]").unwrap();
        assert_eq!(level.price, 88813.5);
        assert_eq!(level.size, 0.25);
    }

    #[test]
    fn test_level_from_json_integers() {
        let level: Level = serde_json::from_str("[111, 0]").unwrap();
        assert_eq!(level, Level::new(111.0, 0.0));
        assert!(level.is_delete());
    }

    #[test]
    fn test_level_serializes_as_array() {
        let json = serde_json::to_string(&Level::new(111.5, 222.0)).unwrap();
        assert_eq!(json, "[111.5,222.0]");
    }

    #[test]
    fn test_level_validate() {
        assert!(Level::new(100.0, 1.0).validate().is_ok());
        assert!(Level::new(100.0, 0.0).validate().is_ok());
        assert!(Level::new(-1.0, 1.0).validate().is_err());
        assert!(Level::new(100.0, -0.5).validate().is_err());
        assert!(Level::new(f64::NAN, 1.0).validate().is_err());
        assert!(Level::new(100.0, f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_row_ratios() {
        let row = DepthRow::new(100.0, 5.0, 20.0);
        assert_eq!(row.fill_ratio(10.0), 0.5);
        assert_eq!(row.depth_ratio(40.0), 0.5);
        assert_eq!(row.fill_ratio(0.0), 0.0);
        assert_eq!(row.fill_ratio(2.0), 1.0);
    }

    #[test]
    fn test_row_serializes_as_triple() {
        let json = serde_json::to_string(&DepthRow::new(111.0, 111.0, 333.0)).unwrap();
        assert_eq!(json, "[111.0,111.0,333.0]");
    }
}
