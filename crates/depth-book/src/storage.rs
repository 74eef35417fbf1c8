//! BTreeMap-based level storage
//!
//! Provides O(log N) operations for one side of the book. A single
//! [`LevelStore`] type serves both sides: the [`BookPrice`] key carries the
//! side, and its `Ord` puts the best price first (highest bid, lowest ask).

use depth_types::{Level, Side};
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Price key whose ordering follows its side of the book
#[derive(Debug, Clone, Copy)]
pub struct BookPrice {
    value: OrderedFloat<f64>,
    side: Side,
}

impl BookPrice {
    /// Create a new key
    pub fn new(value: f64, side: Side) -> Self {
        Self {
            value: OrderedFloat(value),
            side,
        }
    }

    /// The price as a plain number
    pub fn value(&self) -> f64 {
        self.value.into_inner()
    }

    /// Side this key orders for
    pub fn side(&self) -> Side {
        self.side
    }
}

impl PartialEq for BookPrice {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for BookPrice {}

impl PartialOrd for BookPrice {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BookPrice {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.side {
            Side::Bid => other.value.cmp(&self.value),
            Side::Ask => self.value.cmp(&other.value),
        }
    }
}

/// Ordered `price -> size` storage for one side of the book
///
/// Used both for the exact (raw) levels and for the grouped ladder.
#[derive(Debug, Clone)]
pub struct LevelStore {
    side: Side,
    levels: BTreeMap<BookPrice, f64>,
}

impl LevelStore {
    /// Create a new empty store for a side
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    /// Side this store orders for
    pub fn side(&self) -> Side {
        self.side
    }

    fn key(&self, price: f64) -> BookPrice {
        BookPrice::new(price, self.side)
    }

    /// Insert or replace the size at a price, returning the prior size
    pub fn upsert(&mut self, price: f64, size: f64) -> Option<f64> {
        self.levels.insert(self.key(price), size)
    }

    /// Remove the level at a price, returning the removed size
    pub fn remove(&mut self, price: f64) -> Option<f64> {
        self.levels.remove(&self.key(price))
    }

    /// Size currently stored at a price
    pub fn size_at(&self, price: f64) -> Option<f64> {
        self.levels.get(&self.key(price)).copied()
    }

    /// Iterator over levels, best price first
    pub fn iter(&self) -> impl Iterator<Item = Level> + '_ {
        self.levels.iter().map(|(k, size)| Level::new(k.value(), *size))
    }

    /// Best level (highest bid or lowest ask)
    pub fn best(&self) -> Option<Level> {
        self.iter().next()
    }

    /// Worst level currently stored
    pub fn worst(&self) -> Option<Level> {
        self.levels
            .iter()
            .next_back()
            .map(|(k, size)| Level::new(k.value(), *size))
    }

    /// Levels as a vector (for serialization)
    pub fn to_vec(&self) -> Vec<Level> {
        self.iter().collect()
    }

    /// Number of levels
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Clear all levels
    pub fn clear(&mut self) {
        self.levels.clear();
    }

    /// Keep only the best `max_depth` levels, returning how many were dropped
    pub fn truncate(&mut self, max_depth: usize) -> usize {
        let Some(first_dropped) = self.levels.keys().nth(max_depth).copied() else {
            return 0;
        };
        self.levels.split_off(&first_dropped).len()
    }
}
