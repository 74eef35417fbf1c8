//! Demo: Grouped Depth Ladder
//!
//! Showcases: feed decoding, tick grouping, throttled rendering
//!
//! Pipe `book_ui_1` feed frames (one JSON message per line) into stdin:
//!
//! Run: cat frames.jsonl | cargo run --bin stdin_ladder -- --tick 2.5 --rows 12
//!
//! Set `RUST_LOG=debug` to see engine logs on stderr.

use colored::*;
use depth_book::{DepthSnapshot, EngineConfig};
use depth_feed::{FeedSession, SnapshotThrottle, SubscriptionRequest};
use depth_types::{DepthRow, Instrument};
use std::io::{self, BufRead};
use std::time::Instant;
use tracing::warn;
use tracing_subscriber::EnvFilter;

const BAR_WIDTH: usize = 30;

struct Options {
    tick: Option<f64>,
    rows: usize,
}

fn parse_args() -> Result<Options, Box<dyn std::error::Error>> {
    let mut options = Options { tick: None, rows: 10 };
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let value = args.next().ok_or_else(|| format!("missing value for {}", arg))?;
        match arg.as_str() {
            "--tick" => options.tick = Some(value.parse()?),
            "--rows" => options.rows = value.parse()?,
            other => return Err(format!("unknown argument {}", other).into()),
        }
    }
    Ok(options)
}

fn draw_row(row: &DepthRow, max_total: f64, bar: Color) {
    let bar_len = (row.depth_ratio(max_total) * BAR_WIDTH as f64).round() as usize;
    println!(
        "  {:>12.2} {:>12.0} {:>12.0} │{}{}",
        row.price,
        row.size,
        row.total,
        "█".repeat(bar_len).color(bar),
        " ".repeat(BAR_WIDTH - bar_len.min(BAR_WIDTH))
    );
}

fn draw_ladder(snapshot: &DepthSnapshot, rows: usize) {
    print!("\x1B[2J\x1B[H");
    println!("{}", "═".repeat(70).cyan());
    println!(
        "{}{}",
        format!("  {} LADDER", snapshot.instrument).cyan().bold(),
        format!("  (group {})", snapshot.tick_size).dimmed()
    );
    println!("{}", "═".repeat(70).cyan());
    println!(
        "  {:>12} {:>12} {:>12}",
        "PRICE".white().bold(),
        "SIZE".white().bold(),
        "TOTAL".white().bold()
    );

    let max_total = snapshot.max_total();
    for row in snapshot.asks.iter().take(rows).rev() {
        draw_row(row, max_total, Color::Red);
    }

    let spread = snapshot
        .spread()
        .map(|s| format!("SPREAD: {:.2}", s))
        .unwrap_or_else(|| "SPREAD: -".to_string());
    println!("  {} {}", "─".repeat(38), spread.yellow());

    for row in snapshot.bids.iter().take(rows) {
        draw_row(row, max_total, Color::Green);
    }

    println!();
    println!(
        "  {} {}",
        "Updated:".dimmed(),
        chrono::Local::now().format("%H:%M:%S%.3f")
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let options = parse_args()?;
    let mut session = FeedSession::new(EngineConfig::default())?;
    let mut throttle = SnapshotThrottle::default();

    let request = SubscriptionRequest::subscribe(vec![Instrument::XbtUsd.product_id().to_string()]);
    eprintln!("{} Expecting frames for {}", "✓".green(), request.to_json());

    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match session.handle(&line) {
            Ok(event) if event.changed_book() => {
                if let (Some(tick), depth_feed::SessionEvent::Subscribed(_)) = (options.tick, &event) {
                    if let Err(err) = session.set_group_size(tick) {
                        warn!("Keeping default grouping: {}", err);
                    }
                }
                throttle.mark_dirty();
            }
            Ok(_) => {}
            Err(err) if err.is_skippable() => warn!("Dropping frame: {}", err),
            Err(err) => return Err(err.into()),
        }

        if throttle.poll(Instant::now()) {
            draw_ladder(&session.snapshot(), options.rows);
        }
    }

    // Trailing render for whatever arrived inside the last interval
    if throttle.is_dirty() {
        draw_ladder(&session.snapshot(), options.rows);
    }
    Ok(())
}
