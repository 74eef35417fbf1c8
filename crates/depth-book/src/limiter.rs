//! Displayed-depth cap for the grouped ladder

use crate::aggregate::Aggregator;
use crate::storage::LevelStore;

/// Default number of grouped levels kept per side
pub const DEFAULT_MAX_LEVELS: usize = 100;

/// Caps a grouped ladder to its best `max_levels` buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthLimiter {
    max_levels: usize,
}

impl DepthLimiter {
    /// Create a limiter keeping `max_levels` buckets per side
    pub fn new(max_levels: usize) -> Self {
        Self { max_levels }
    }

    /// Maximum number of buckets kept
    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Drop everything past the best `max_levels` buckets, returning the dropped count
    pub fn trim(&self, grouped: &mut LevelStore) -> usize {
        grouped.truncate(self.max_levels)
    }

    /// Pull buckets that fell back within the cap from the full aggregate.
    ///
    /// After levels near the top are deleted, buckets dropped by an earlier
    /// [`trim`](Self::trim) may belong in view again. Returns the number added.
    pub fn refill(&self, grouped: &mut LevelStore, aggregate: &Aggregator) -> usize {
        let room = self.max_levels.saturating_sub(grouped.len());
        if room == 0 {
            return 0;
        }
        let missing: Vec<_> = match grouped.worst() {
            Some(worst) => aggregate.iter_after(worst.price).take(room).collect(),
            None => aggregate.iter().take(room).collect(),
        };
        for level in &missing {
            grouped.upsert(level.price, level.size);
        }
        missing.len()
    }

    /// Build a capped ladder from a full aggregate
    pub fn project(&self, aggregate: &Aggregator) -> LevelStore {
        let mut grouped = LevelStore::new(aggregate.side());
        self.refill(&mut grouped, aggregate);
        grouped
    }
}

impl Default for DepthLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LEVELS)
    }
}
