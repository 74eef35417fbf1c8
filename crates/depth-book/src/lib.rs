//! Tick-grouped, depth-limited orderbook engine
//!
//! This crate keeps the exact price levels of a live L2 feed and derives the
//! grouped ladder a depth view renders: levels bucketed by a selectable tick
//! size, capped to the best `max_levels` buckets per side.
//!
//! # Constraints
//!
//! - NO `tokio`, NO networking
//! - Synchronous and single-owner; every mutation completes inside `&mut self`
//!
//! # Example
//!
//! ```
//! use depth_book::BookEngine;
//! use depth_types::{BookPage, Instrument};
//!
//! let mut book = BookEngine::for_instrument(Instrument::XbtUsd);
//! book.apply_delta(&BookPage::new().with_bids([(100.0, 1.5)]).with_asks([(100.5, 2.0)]));
//!
//! let snapshot = book.snapshot();
//! assert_eq!(snapshot.spread(), Some(0.5));
//! ```

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod limiter;
pub mod snapshot;
pub mod storage;

// Re-export main types
pub use aggregate::{bucket, Aggregator, BucketChange};
pub use config::{ConsistencyPolicy, EngineConfig};
pub use engine::{ApplyReport, BookEngine};
pub use limiter::{DepthLimiter, DEFAULT_MAX_LEVELS};
pub use snapshot::DepthSnapshot;
pub use storage::{BookPrice, LevelStore};
