//! Common fixtures for engine integration tests
//!
//! A naive reference model rebuilds the grouped ladder from scratch after
//! every page so the incremental engine can be compared against it.

#![allow(dead_code)]

use depth_book::{bucket, BookEngine, ConsistencyPolicy, EngineConfig};
use depth_types::{BookPage, DepthRow, Instrument, Side, TickSize};
use rand::rngs::StdRng;
use rand::Rng;

/// Engine for an instrument with a custom depth cap, checking every mutation
pub fn engine_with(instrument: Instrument, max_levels: usize) -> BookEngine {
    let config = EngineConfig::builder()
        .instrument(instrument)
        .max_levels(max_levels)
        .consistency(ConsistencyPolicy::Fatal)
        .build();
    BookEngine::new(config).unwrap()
}

/// Build rows with running totals from `(price, size, total)` triples
pub fn rows(levels: &[(f64, f64, f64)]) -> Vec<DepthRow> {
    levels.iter().copied().map(DepthRow::from).collect()
}

/// Raw levels kept as a plain list, last write wins
#[derive(Debug, Default, Clone)]
pub struct ReferenceBook {
    pub bids: Vec<(f64, f64)>,
    pub asks: Vec<(f64, f64)>,
}

impl ReferenceBook {
    fn side_mut(&mut self, side: Side) -> &mut Vec<(f64, f64)> {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }

    pub fn side(&self, side: Side) -> &[(f64, f64)] {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    pub fn apply(&mut self, page: &BookPage) {
        for side in Side::BOTH {
            let Some(levels) = page.side(side) else {
                continue;
            };
            for level in levels {
                let book = self.side_mut(side);
                book.retain(|(price, _)| *price != level.price);
                if level.size > 0.0 {
                    book.push((level.price, level.size));
                }
            }
        }
    }

    /// Group, sort and cap one side from scratch
    pub fn ladder(&self, side: Side, tick: TickSize, max_levels: usize) -> Vec<DepthRow> {
        let mut buckets: Vec<(f64, f64)> = Vec::new();
        for (price, size) in self.side(side) {
            let key = bucket(*price, tick);
            match buckets.iter_mut().find(|(b, _)| *b == key) {
                Some(entry) => entry.1 += size,
                None => buckets.push((key, *size)),
            }
        }
        buckets.sort_by(|a, b| side.cmp_prices(a.0, b.0));

        let mut total = 0.0;
        buckets
            .into_iter()
            .take(max_levels)
            .map(|(price, size)| {
                total += size;
                DepthRow::new(price, size, total)
            })
            .collect()
    }
}

/// Random page on a `step` grid around `mid` with whole sizes, roughly one entry in four a delete
pub fn random_page(rng: &mut StdRng, mid: f64, step: f64, entries: usize) -> BookPage {
    random_page_with(rng, mid, step, entries, |rng| rng.gen_range(1..=500) as f64)
}

/// Like [`random_page`], with fractional sizes from 1e-3 up to 1e8
pub fn random_fractional_page(rng: &mut StdRng, mid: f64, step: f64, entries: usize) -> BookPage {
    random_page_with(rng, mid, step, entries, |rng| {
        let mantissa = rng.gen_range(1..1000) as f64 / 1000.0;
        mantissa * 10f64.powi(rng.gen_range(-2..=8))
    })
}

fn random_page_with(
    rng: &mut StdRng,
    mid: f64,
    step: f64,
    entries: usize,
    size: impl Fn(&mut StdRng) -> f64,
) -> BookPage {
    let mut page = BookPage::new();
    for side in Side::BOTH {
        let levels: Vec<(f64, f64)> = (0..rng.gen_range(0..=entries))
            .map(|_| {
                let offset = rng.gen_range(1..=200) as f64 * step;
                let price = match side {
                    Side::Bid => mid - offset,
                    Side::Ask => mid + offset,
                };
                let size = if rng.gen_bool(0.25) { 0.0 } else { size(&mut *rng) };
                (price, size)
            })
            .collect();
        page = match side {
            Side::Bid => page.with_bids(levels),
            Side::Ask => page.with_asks(levels),
        };
    }
    page
}

/// Compare ladders row by row: prices exactly, sizes and totals to a relative 1e-9
pub fn assert_ladder_close(actual: &[DepthRow], expected: &[DepthRow]) {
    assert_eq!(actual.len(), expected.len(), "ladder length");
    let close = |a: f64, b: f64| (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1e-12);
    for (have, want) in actual.iter().zip(expected) {
        assert_eq!(have.price, want.price);
        assert!(close(have.size, want.size), "size at {}: {} vs {}", have.price, have.size, want.size);
        assert!(close(have.total, want.total), "total at {}: {} vs {}", have.price, have.total, want.total);
    }
}
