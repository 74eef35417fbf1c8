//! Benchmarks for engine operations
//!
//! Run with: cargo bench --bench engine

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use depth_book::{BookEngine, LevelStore};
use depth_types::{BookPage, Instrument, Side};

/// Create a page with `count` levels per side around a mid price
fn create_page(mid: f64, count: usize, step: f64) -> BookPage {
    BookPage::new()
        .with_bids((1..=count).map(|i| (mid - step * i as f64, 1.0 + i as f64 / 10.0)))
        .with_asks((1..=count).map(|i| (mid + step * i as f64, 1.0 + i as f64 / 10.0)))
}

fn loaded_engine(levels: usize) -> BookEngine {
    let mut book = BookEngine::for_instrument(Instrument::XbtUsd);
    book.apply_delta(&create_page(50_000.0, levels, 0.5));
    book
}

fn bench_store_upsert(c: &mut Criterion) {
    let mut group = c.benchmark_group("level_store_upsert");

    for size in [10, 100, 1000] {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let mut store = LevelStore::new(Side::Bid);
                for i in 0..size {
                    store.upsert(black_box(50_000.0 - i as f64), black_box(1.0));
                }
                black_box(store)
            })
        });
    }

    group.finish();
}

fn bench_apply_snapshot_page(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_snapshot_page");

    for size in [25, 100, 500] {
        let page = create_page(50_000.0, size, 0.5);
        group.throughput(Throughput::Elements(2 * size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &page, |b, page| {
            b.iter(|| {
                let mut book = BookEngine::for_instrument(Instrument::XbtUsd);
                black_box(book.apply_delta(black_box(page)))
            })
        });
    }

    group.finish();
}

fn bench_apply_delta(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply_delta");
    let mut book = loaded_engine(500);

    group.bench_function("update_top", |b| {
        let page = BookPage::new().with_bids([(49_999.5, 3.0)]);
        b.iter(|| black_box(book.apply_delta(black_box(&page))))
    });

    group.bench_function("delete_and_restore_top", |b| {
        let delete = BookPage::new().with_asks([(50_000.5, 0.0)]);
        let restore = BookPage::new().with_asks([(50_000.5, 1.1)]);
        b.iter(|| {
            book.apply_delta(black_box(&delete));
            black_box(book.apply_delta(black_box(&restore)))
        })
    });

    group.finish();
}

fn bench_regroup(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_group_size");

    for size in [100, 1000] {
        let mut book = loaded_engine(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                book.set_group_size(black_box(2.5)).ok();
                book.set_group_size(black_box(0.5)).ok();
            })
        });
    }

    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let book = loaded_engine(1000);

    c.bench_function("snapshot", |b| b.iter(|| black_box(book.snapshot())));
}

criterion_group!(
    benches,
    bench_store_upsert,
    bench_apply_snapshot_page,
    bench_apply_delta,
    bench_regroup,
    bench_snapshot
);
criterion_main!(benches);
