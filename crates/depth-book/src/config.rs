//! Engine configuration
//!
//! # Example
//!
//! ```
//! use depth_book::{ConsistencyPolicy, EngineConfig};
//! use depth_types::Instrument;
//!
//! let config = EngineConfig::builder()
//!     .instrument(Instrument::EthUsd)
//!     .max_levels(25)
//!     .tick_size(0.1)
//!     .consistency(ConsistencyPolicy::Heal)
//!     .build();
//! assert_eq!(config.max_levels, 25);
//! ```

use crate::limiter::DEFAULT_MAX_LEVELS;
use depth_types::{BookError, BookResult, Instrument, TickSize};
use typed_builder::TypedBuilder;

/// What the engine does when an aggregate no longer matches its raw levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsistencyPolicy {
    /// Never check
    Off,
    /// Check the buckets each page touched; log and rebuild from the raw levels on mismatch
    Heal,
    /// Check the whole book after every page; panic on mismatch
    Fatal,
}

impl Default for ConsistencyPolicy {
    /// `Fatal` in debug and test builds, `Heal` in release builds
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Fatal
        } else {
            Self::Heal
        }
    }
}

/// Parameters for [`BookEngine::new`](crate::BookEngine::new).
///
/// Use [`EngineConfig::builder()`] to get a builder with all the preset defaults.
#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct EngineConfig {
    /// Instrument whose tick-size table applies
    #[builder(default)]
    pub instrument: Instrument,
    /// Grouped levels kept per side
    #[builder(default = DEFAULT_MAX_LEVELS)]
    pub max_levels: usize,
    /// Initial grouping size; `None` means the instrument's smallest
    #[builder(default, setter(strip_option))]
    pub tick_size: Option<f64>,
    /// Invariant checking behaviour
    #[builder(default)]
    pub consistency: ConsistencyPolicy,
}

impl EngineConfig {
    /// Default configuration for an instrument
    pub fn for_instrument(instrument: Instrument) -> Self {
        Self::builder().instrument(instrument).build()
    }

    /// Check the configuration and resolve the initial tick size
    pub fn validate(&self) -> BookResult<TickSize> {
        if self.max_levels == 0 {
            return Err(BookError::Configuration(
                "max_levels must be at least 1".to_string(),
            ));
        }
        match self.tick_size {
            Some(tick) => self.instrument.tick_size(tick),
            None => Ok(self.instrument.default_tick()),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}
