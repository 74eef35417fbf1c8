//! Instruments and the tick sizes each one offers for grouping
//!
//! All per-instrument settings live in one table, [`INSTRUMENTS`], keyed
//! by [`Instrument`].

use crate::BookError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A tradable product on the book feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Instrument {
    /// Bitcoin perpetual, `PI_XBTUSD`
    XbtUsd,
    /// Ether perpetual, `PI_ETHUSD`
    EthUsd,
}

/// Static settings for one instrument
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstrumentSpec {
    /// Instrument this row describes
    pub instrument: Instrument,
    /// Product id used by the feed
    pub product_id: &'static str,
    /// Offered grouping sizes, smallest first
    pub tick_sizes: &'static [f64],
}

/// Instrument configuration table, in [`Instrument`] declaration order
pub const INSTRUMENTS: [InstrumentSpec; 2] = [
    InstrumentSpec {
        instrument: Instrument::XbtUsd,
        product_id: "PI_XBTUSD",
        tick_sizes: &[0.5, 1.0, 2.5],
    },
    InstrumentSpec {
        instrument: Instrument::EthUsd,
        product_id: "PI_ETHUSD",
        tick_sizes: &[0.05, 0.1, 0.25],
    },
];

impl Instrument {
    /// All known instruments
    pub const ALL: [Instrument; 2] = [Instrument::XbtUsd, Instrument::EthUsd];

    /// Configuration row for this instrument
    pub fn spec(&self) -> &'static InstrumentSpec {
        match self {
            Self::XbtUsd => &INSTRUMENTS[0],
            Self::EthUsd => &INSTRUMENTS[1],
        }
    }

    /// Product id as used by the feed (e.g. `PI_XBTUSD`)
    pub fn product_id(&self) -> &'static str {
        self.spec().product_id
    }

    /// Offered grouping sizes, smallest first
    pub fn tick_sizes(&self) -> &'static [f64] {
        self.spec().tick_sizes
    }

    /// The smallest offered grouping size
    pub fn default_tick(&self) -> TickSize {
        TickSize(self.tick_sizes()[0])
    }

    /// Validate a requested grouping size against this instrument's table
    pub fn tick_size(&self, value: f64) -> Result<TickSize, BookError> {
        self.tick_sizes()
            .iter()
            .copied()
            .find(|allowed| (allowed - value).abs() <= f64::EPSILON * allowed.max(1.0))
            .map(TickSize)
            .ok_or(BookError::InvalidTickSize {
                instrument: *self,
                tick: value,
                allowed: self.tick_sizes(),
            })
    }

    /// Look up an instrument by feed product id (case-insensitive)
    pub fn from_product_id(product_id: &str) -> Option<Self> {
        INSTRUMENTS
            .iter()
            .find(|spec| spec.product_id.eq_ignore_ascii_case(product_id))
            .map(|spec| spec.instrument)
    }
}

impl Default for Instrument {
    fn default() -> Self {
        Self::XbtUsd
    }
}

impl FromStr for Instrument {
    type Err = InstrumentParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_product_id(s.trim()).ok_or_else(|| InstrumentParseError(s.to_string()))
    }
}

impl TryFrom<String> for Instrument {
    type Error = InstrumentParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Instrument> for String {
    fn from(instrument: Instrument) -> Self {
        instrument.product_id().to_string()
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.product_id())
    }
}

/// Error parsing an instrument
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown product id: {0}")]
pub struct InstrumentParseError(pub String);

/// A grouping size taken from an instrument's table.
///
/// Only [`Instrument::tick_size`] and [`Instrument::default_tick`] create one.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct TickSize(f64);

impl TickSize {
    /// The size as a plain number
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for TickSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
