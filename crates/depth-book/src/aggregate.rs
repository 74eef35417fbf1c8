//! Tick-size grouping of raw levels
//!
//! The [`Aggregator`] keeps the complete grouped view of one side up to date
//! incrementally. For every raw price it remembers the bucket that price
//! currently contributes to, so an update first withdraws the level from its
//! prior bucket and only then adds the new size to the new bucket. Buckets
//! keep their member levels and disappear with the last one.
//!
//! A withdrawal re-sums the bucket from its remaining members instead of
//! subtracting, so a large size leaving a bucket cannot strand rounding error
//! on the small sizes still in it.
//!
//! A tick-size change moves every bucket boundary; the only correct response
//! is [`Aggregator::rebuild_all`].

use crate::storage::{BookPrice, LevelStore};
use depth_types::{BookError, BookResult, Level, Side, TickSize};
use ordered_float::OrderedFloat;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Relative slack added before flooring `price / tick`.
///
/// Absorbs representation error such as `0.15 / 0.05 = 2.9999999999999996`.
const BUCKET_EPSILON: f64 = 1e-9;

/// Relative tolerance when comparing an incremental bucket to a fresh sum
const CONSISTENCY_TOLERANCE: f64 = 1e-9;

/// Bucket price for `price` under `tick`, rounded to two decimals.
///
/// Equivalent to `price - (price mod tick)` without the drift of a float
/// remainder.
///
/// ```
/// use depth_book::bucket;
/// use depth_types::Instrument;
///
/// let tick = Instrument::XbtUsd.tick_size(1.0).unwrap();
/// assert_eq!(bucket(111.5, tick), 111.0);
///
/// let tick = Instrument::EthUsd.tick_size(0.05).unwrap();
/// assert_eq!(bucket(0.15, tick), 0.15);
/// ```
pub fn bucket(price: f64, tick: TickSize) -> f64 {
    let tick = tick.value();
    let steps = price / tick;
    let steps = (steps + steps.abs().max(1.0) * BUCKET_EPSILON).floor();
    (steps * tick * 100.0).round() / 100.0
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= CONSISTENCY_TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Bucket {
    size: f64,
    /// Raw price -> size of every level in the bucket
    members: BTreeMap<OrderedFloat<f64>, f64>,
}

impl Bucket {
    fn resum(&mut self) {
        self.size = self.members.values().sum();
    }
}

/// Buckets touched by a single raw change
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BucketChange {
    /// Bucket the prior size was withdrawn from
    pub withdrawn: Option<f64>,
    /// Bucket the new size was added to
    pub contributed: Option<f64>,
}

impl BucketChange {
    /// Touched bucket prices, without duplicates
    pub fn buckets(&self) -> impl Iterator<Item = f64> {
        let contributed = self.contributed.filter(|c| Some(*c) != self.withdrawn);
        self.withdrawn.into_iter().chain(contributed)
    }

    /// Check if nothing changed
    pub fn is_empty(&self) -> bool {
        self.withdrawn.is_none() && self.contributed.is_none()
    }
}

/// Incrementally maintained `bucket -> aggregated size` view of one side
#[derive(Debug, Clone)]
pub struct Aggregator {
    side: Side,
    tick: TickSize,
    buckets: BTreeMap<BookPrice, Bucket>,
    /// Raw price -> bucket it currently contributes to
    contributions: HashMap<OrderedFloat<f64>, BookPrice>,
}

impl Aggregator {
    /// Create an empty aggregator
    pub fn new(side: Side, tick: TickSize) -> Self {
        Self {
            side,
            tick,
            buckets: BTreeMap::new(),
            contributions: HashMap::new(),
        }
    }

    /// Side this aggregator orders for
    pub fn side(&self) -> Side {
        self.side
    }

    /// Active grouping size
    pub fn tick(&self) -> TickSize {
        self.tick
    }

    /// Number of non-empty buckets
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Check if there are no buckets
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Aggregated size of a bucket
    pub fn size_at(&self, bucket_price: f64) -> Option<f64> {
        self.buckets
            .get(&BookPrice::new(bucket_price, self.side))
            .map(|b| b.size)
    }

    /// Buckets, best first
    pub fn iter(&self) -> impl Iterator<Item = Level> + '_ {
        self.buckets
            .iter()
            .map(|(k, b)| Level::new(k.value(), b.size))
    }

    /// Buckets strictly worse than `bucket_price`, best first
    pub fn iter_after(&self, bucket_price: f64) -> impl Iterator<Item = Level> + '_ {
        use std::ops::Bound::{Excluded, Unbounded};
        self.buckets
            .range((Excluded(BookPrice::new(bucket_price, self.side)), Unbounded))
            .map(|(k, b)| Level::new(k.value(), b.size))
    }

    /// Size the raw level at `price` currently contributes
    pub fn member_size(&self, price: f64) -> Option<f64> {
        let key = self.contributions.get(&OrderedFloat(price))?;
        self.buckets.get(key)?.members.get(&OrderedFloat(price)).copied()
    }

    /// Record that the raw level at `price` was set to `size`
    pub fn on_upsert(&mut self, price: f64, size: f64) -> BucketChange {
        if self.member_size(price) == Some(size) {
            return BucketChange::default();
        }
        BucketChange {
            withdrawn: self.withdraw(price),
            contributed: Some(self.contribute(price, size)),
        }
    }

    /// Record that the raw level at `price` was deleted
    pub fn on_remove(&mut self, price: f64) -> BucketChange {
        BucketChange {
            withdrawn: self.withdraw(price),
            contributed: None,
        }
    }

    fn contribute(&mut self, price: f64, size: f64) -> f64 {
        let key = BookPrice::new(bucket(price, self.tick), self.side);
        let entry = self.buckets.entry(key).or_default();
        entry.members.insert(OrderedFloat(price), size);
        entry.size += size;
        self.contributions.insert(OrderedFloat(price), key);
        key.value()
    }

    fn withdraw(&mut self, price: f64) -> Option<f64> {
        let key = self.contributions.remove(&OrderedFloat(price))?;
        if let Some(entry) = self.buckets.get_mut(&key) {
            entry.members.remove(&OrderedFloat(price));
            if entry.members.is_empty() {
                self.buckets.remove(&key);
            } else {
                entry.resum();
            }
        }
        Some(key.value())
    }

    /// Re-bucket every raw level from scratch under `tick`
    pub fn rebuild_all(&mut self, raw: &LevelStore, tick: TickSize) {
        self.tick = tick;
        self.load(raw);
        debug!(
            "Rebuilt {} aggregate at tick {}: {} levels into {} buckets",
            self.side,
            tick,
            raw.len(),
            self.buckets.len()
        );
    }

    fn load(&mut self, raw: &LevelStore) {
        self.clear();
        for level in raw.iter() {
            self.contribute(level.price, level.size);
        }
    }

    /// Drop all buckets, keeping the tick size
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.contributions.clear();
    }

    /// Compare every bucket against a fresh aggregation of `raw`
    pub fn verify(&self, raw: &LevelStore) -> BookResult<()> {
        let mut expected = Aggregator::new(self.side, self.tick);
        expected.load(raw);

        let mismatch = |bucket: &BookPrice, expected: f64, actual: f64| BookError::Consistency {
            side: self.side,
            bucket: bucket.value(),
            expected,
            actual,
        };

        for (key, want) in &expected.buckets {
            match self.buckets.get(key) {
                Some(have) if have.members == want.members && approx_eq(have.size, want.size) => {}
                Some(have) => return Err(mismatch(key, want.size, have.size)),
                None => return Err(mismatch(key, want.size, 0.0)),
            }
        }
        if let Some((key, have)) = self
            .buckets
            .iter()
            .find(|(key, _)| !expected.buckets.contains_key(key))
        {
            return Err(mismatch(key, 0.0, have.size));
        }
        Ok(())
    }

    /// Check only the given buckets against the raw levels they were built from.
    ///
    /// Every member must still hold its raw size and the bucket must equal the
    /// sum of its members. Cost is proportional to the members of those buckets.
    pub fn verify_buckets(
        &self,
        raw: &LevelStore,
        buckets: impl IntoIterator<Item = f64>,
    ) -> BookResult<()> {
        for bucket_price in buckets {
            let Some(entry) = self.buckets.get(&BookPrice::new(bucket_price, self.side)) else {
                continue;
            };
            let mut expected = 0.0;
            for price in entry.members.keys() {
                expected += raw.size_at(price.into_inner()).unwrap_or(0.0);
            }
            let members_match = entry
                .members
                .iter()
                .all(|(price, size)| raw.size_at(price.into_inner()) == Some(*size));
            if !members_match || !approx_eq(entry.size, expected) {
                return Err(BookError::Consistency {
                    side: self.side,
                    bucket: bucket_price,
                    expected,
                    actual: entry.size,
                });
            }
        }
        Ok(())
    }
}
