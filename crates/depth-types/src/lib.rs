//! Shared types for the depth book engine
//!
//! This crate provides the value types passed between the feed decoder,
//! the book engine and whatever renders the ladder. It has minimal
//! dependencies and can be used independently.
//!
//! # Key Types
//!
//! - [`Level`] - A `(price, size)` pair as carried by a delta
//! - [`DepthRow`] - A grouped row with its cumulative total
//! - [`Side`] - Bid or ask, and the price ordering each implies
//! - [`BookPage`] - One incremental update for either or both sides
//! - [`Instrument`], [`TickSize`] - Per-instrument grouping sizes
//! - [`BookError`] - Error types

pub mod error;
pub mod instrument;
pub mod level;
pub mod page;
pub mod side;

// Re-export commonly used types
pub use error::*;
pub use instrument::*;
pub use level::*;
pub use page::*;
pub use side::*;
