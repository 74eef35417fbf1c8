//! Book engine
//!
//! Coordinates raw storage, tick grouping and the depth cap for both sides.
//!
//! # Flow
//!
//! ```text
//! BookPage → LevelStore (raw) → Aggregator (every bucket) → DepthLimiter → grouped ladder → snapshot()
//! ```
//!
//! Every mutation runs to completion inside a `&mut self` call. Hosts that
//! share an engine between threads serialize access themselves.

use crate::{
    aggregate::{Aggregator, BucketChange},
    config::{ConsistencyPolicy, EngineConfig},
    limiter::{DepthLimiter, DEFAULT_MAX_LEVELS},
    snapshot::DepthSnapshot,
    storage::LevelStore,
};
use depth_types::{BookError, BookPage, BookResult, DepthRow, Instrument, Level, Side, TickSize};
use tracing::{debug, info, warn};

/// Outcome of applying one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    /// Entries that created or replaced a level
    pub upserts: usize,
    /// Delete entries processed (including deletes of absent prices)
    pub deletes: usize,
    /// Entries skipped, one error each
    pub errors: Vec<BookError>,
}

impl ApplyReport {
    /// Check if every entry was usable
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of entries that were skipped
    pub fn skipped(&self) -> usize {
        self.errors.len()
    }

    /// Fold another report into this one
    pub fn merge(&mut self, other: ApplyReport) {
        self.upserts += other.upserts;
        self.deletes += other.deletes;
        self.errors.extend(other.errors);
    }
}

/// Raw levels, full aggregate and capped ladder for one side
#[derive(Debug, Clone)]
struct BookSide {
    raw: LevelStore,
    aggregate: Aggregator,
    grouped: LevelStore,
    /// Buckets changed since the last consistency check
    touched: Vec<f64>,
}

impl BookSide {
    fn new(side: Side, tick: TickSize) -> Self {
        Self {
            raw: LevelStore::new(side),
            aggregate: Aggregator::new(side, tick),
            grouped: LevelStore::new(side),
            touched: Vec::new(),
        }
    }

    /// Apply a validated level; returns false for a delete
    fn apply(&mut self, level: Level, limiter: DepthLimiter) -> bool {
        let change = if level.is_delete() {
            match self.raw.remove(level.price) {
                Some(_) => self.aggregate.on_remove(level.price),
                None => BucketChange::default(),
            }
        } else {
            self.raw.upsert(level.price, level.size);
            self.aggregate.on_upsert(level.price, level.size)
        };
        self.sync(change, limiter);
        !level.is_delete()
    }

    /// Mirror touched buckets into the capped ladder, then cap it again
    fn sync(&mut self, change: BucketChange, limiter: DepthLimiter) {
        if change.is_empty() {
            return;
        }
        for bucket in change.buckets() {
            self.touched.push(bucket);
            match self.aggregate.size_at(bucket) {
                Some(size) => {
                    self.grouped.upsert(bucket, size);
                }
                None => {
                    self.grouped.remove(bucket);
                }
            }
        }
        limiter.trim(&mut self.grouped);
        limiter.refill(&mut self.grouped, &self.aggregate);
    }

    fn rebuild(&mut self, tick: TickSize, limiter: DepthLimiter) {
        self.aggregate.rebuild_all(&self.raw, tick);
        self.grouped = limiter.project(&self.aggregate);
        self.touched.clear();
    }

    fn clear(&mut self) {
        self.raw.clear();
        self.aggregate.clear();
        self.grouped.clear();
        self.touched.clear();
    }

    /// Check the whole aggregate against the raw levels and the ladder against the aggregate
    fn verify(&self, limiter: DepthLimiter) -> BookResult<()> {
        self.aggregate.verify(&self.raw)?;
        self.verify_ladder(limiter)
    }

    /// Check only the buckets touched since the last check, plus the ladder
    fn verify_touched(&self, limiter: DepthLimiter) -> BookResult<()> {
        self.aggregate
            .verify_buckets(&self.raw, self.touched.iter().copied())?;
        self.verify_ladder(limiter)
    }

    fn verify_ladder(&self, limiter: DepthLimiter) -> BookResult<()> {
        let side = self.raw.side();
        let mut expected = self.aggregate.iter().take(limiter.max_levels());
        let mut shown = self.grouped.iter();
        loop {
            match (expected.next(), shown.next()) {
                (None, None) => return Ok(()),
                (Some(want), Some(have)) if want == have => {}
                (Some(want), have) => {
                    return Err(BookError::Consistency {
                        side,
                        bucket: want.price,
                        expected: want.size,
                        actual: have.filter(|h| h.price == want.price).map_or(0.0, |h| h.size),
                    })
                }
                (None, Some(extra)) => {
                    return Err(BookError::Consistency {
                        side,
                        bucket: extra.price,
                        expected: 0.0,
                        actual: extra.size,
                    })
                }
            }
        }
    }

    fn rows(&self) -> Vec<DepthRow> {
        let mut total = 0.0;
        self.grouped
            .iter()
            .map(|level| {
                total += level.size;
                DepthRow::new(level.price, level.size, total)
            })
            .collect()
    }
}

/// Live, tick-grouped, depth-limited book for one instrument
///
/// # Example
///
/// ```
/// use depth_book::BookEngine;
/// use depth_types::{BookPage, DepthRow, Instrument};
///
/// let mut book = BookEngine::for_instrument(Instrument::XbtUsd);
/// book.set_group_size(1.0).unwrap();
///
/// let report = book.apply_delta(&BookPage::new().with_asks([(111.0, 111.0), (111.5, 222.0)]));
/// assert!(report.is_clean());
///
/// let snapshot = book.snapshot();
/// assert_eq!(snapshot.asks, vec![DepthRow::new(111.0, 333.0, 333.0)]);
/// ```
#[derive(Debug, Clone)]
pub struct BookEngine {
    instrument: Instrument,
    tick: TickSize,
    limiter: DepthLimiter,
    consistency: ConsistencyPolicy,
    bids: BookSide,
    asks: BookSide,
}

impl BookEngine {
    /// Create an engine from a configuration
    pub fn new(config: EngineConfig) -> BookResult<Self> {
        let tick = config.validate()?;
        Ok(Self {
            instrument: config.instrument,
            tick,
            limiter: DepthLimiter::new(config.max_levels),
            consistency: config.consistency,
            bids: BookSide::new(Side::Bid, tick),
            asks: BookSide::new(Side::Ask, tick),
        })
    }

    /// Create an engine with default settings for an instrument
    pub fn for_instrument(instrument: Instrument) -> Self {
        let tick = instrument.default_tick();
        Self {
            instrument,
            tick,
            limiter: DepthLimiter::new(DEFAULT_MAX_LEVELS),
            consistency: ConsistencyPolicy::default(),
            bids: BookSide::new(Side::Bid, tick),
            asks: BookSide::new(Side::Ask, tick),
        }
    }

    /// Get the instrument
    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    /// Get the active grouping size
    pub fn tick_size(&self) -> TickSize {
        self.tick
    }

    /// Get the depth cap
    pub fn max_levels(&self) -> usize {
        self.limiter.max_levels()
    }

    /// Get the consistency policy
    pub fn consistency(&self) -> ConsistencyPolicy {
        self.consistency
    }

    fn book(&self, side: Side) -> &BookSide {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    fn book_mut(&mut self, side: Side) -> &mut BookSide {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }

    /// Exact levels for a side
    pub fn raw_levels(&self, side: Side) -> &LevelStore {
        &self.book(side).raw
    }

    /// Complete, uncapped aggregate for a side
    pub fn aggregate(&self, side: Side) -> &Aggregator {
        &self.book(side).aggregate
    }

    /// Capped grouped ladder for a side
    pub fn grouped_levels(&self, side: Side) -> &LevelStore {
        &self.book(side).grouped
    }

    /// Number of exact levels on a side
    pub fn raw_len(&self, side: Side) -> usize {
        self.book(side).raw.len()
    }

    /// Number of grouped levels in view on a side
    pub fn grouped_len(&self, side: Side) -> usize {
        self.book(side).grouped.len()
    }

    /// Get the best exact bid
    pub fn best_bid(&self) -> Option<Level> {
        self.bids.raw.best()
    }

    /// Get the best exact ask
    pub fn best_ask(&self) -> Option<Level> {
        self.asks.raw.best()
    }

    /// Get the spread (ask - bid)
    pub fn spread(&self) -> Option<f64> {
        Some(self.best_ask()?.price - self.best_bid()?.price)
    }

    /// Get the mid price ((ask + bid) / 2)
    pub fn mid_price(&self) -> Option<f64> {
        Some((self.best_ask()?.price + self.best_bid()?.price) / 2.0)
    }

    /// Apply one delta page.
    ///
    /// Entries are applied in page order, bids then asks; a size of zero
    /// deletes the level. Malformed entries are skipped and reported in the
    /// returned [`ApplyReport`] without affecting the rest of the page.
    pub fn apply_delta(&mut self, page: &BookPage) -> ApplyReport {
        let mut report = ApplyReport::default();
        let limiter = self.limiter;

        for side in Side::BOTH {
            let Some(levels) = page.side(side) else {
                continue;
            };
            let book = self.book_mut(side);
            for (index, level) in levels.iter().enumerate() {
                if let Err(reason) = level.validate() {
                    let err = BookError::malformed(
                        side,
                        index,
                        format!("[{}, {}]", level.price, level.size),
                        reason,
                    );
                    warn!("Skipping entry: {}", err);
                    report.errors.push(err);
                    continue;
                }
                if book.apply(*level, limiter) {
                    report.upserts += 1;
                } else {
                    report.deletes += 1;
                }
            }
        }

        self.enforce_consistency();

        debug!(
            "Applied page to {}: {} upserts, {} deletes, {} skipped",
            self.instrument,
            report.upserts,
            report.deletes,
            report.skipped()
        );
        report
    }

    /// Change the grouping size.
    ///
    /// The size must come from the instrument's table; otherwise the book is
    /// left untouched and [`BookError::InvalidTickSize`] is returned.
    pub fn set_group_size(&mut self, tick: f64) -> BookResult<()> {
        let tick = self.instrument.tick_size(tick).map_err(|err| {
            warn!("Rejected grouping change: {}", err);
            err
        })?;

        self.tick = tick;
        let limiter = self.limiter;
        self.bids.rebuild(tick, limiter);
        self.asks.rebuild(tick, limiter);

        debug!("Regrouped {} at tick {}", self.instrument, tick);
        Ok(())
    }

    /// Clear both sides.
    ///
    /// Instrument and grouping size are kept.
    pub fn reset(&mut self) {
        self.bids.clear();
        self.asks.clear();
        debug!("Reset book for {}", self.instrument);
    }

    /// Clear both sides and move to another instrument at its smallest tick size
    pub fn switch_instrument(&mut self, instrument: Instrument) {
        self.reset();
        self.instrument = instrument;
        self.tick = instrument.default_tick();
        let limiter = self.limiter;
        let tick = self.tick;
        self.bids.rebuild(tick, limiter);
        self.asks.rebuild(tick, limiter);
        info!("Switched book to {} at tick {}", instrument, tick);
    }

    /// Capture the grouped ladder with fresh running totals
    pub fn snapshot(&self) -> DepthSnapshot {
        DepthSnapshot {
            instrument: self.instrument,
            tick_size: self.tick.value(),
            max_levels: self.limiter.max_levels(),
            bids: self.bids.rows(),
            asks: self.asks.rows(),
        }
    }

    /// Check both sides against the aggregation invariant
    pub fn verify(&self) -> BookResult<()> {
        self.bids.verify(self.limiter)?;
        self.asks.verify(self.limiter)
    }

    fn enforce_consistency(&mut self) {
        let policy = self.consistency;
        if policy == ConsistencyPolicy::Off {
            self.bids.touched.clear();
            self.asks.touched.clear();
            return;
        }
        let (tick, limiter) = (self.tick, self.limiter);
        for side in Side::BOTH {
            let book = self.book_mut(side);
            let checked = match policy {
                ConsistencyPolicy::Fatal => book.verify(limiter),
                ConsistencyPolicy::Heal | ConsistencyPolicy::Off => book.verify_touched(limiter),
            };
            book.touched.clear();
            if let Err(err) = checked {
                match policy {
                    ConsistencyPolicy::Fatal => panic!("{}", err),
                    ConsistencyPolicy::Heal => {
                        warn!("{}; rebuilding {} from raw levels", err, side);
                        book.rebuild(tick, limiter);
                    }
                    ConsistencyPolicy::Off => {}
                }
            }
        }
    }
}

impl Default for BookEngine {
    fn default() -> Self {
        Self::for_instrument(Instrument::default())
    }
}
