//! Common test utilities and fixtures for session tests
//!
//! Messages follow the shape of the public `book_ui_1` feed

#![allow(dead_code)]

use depth_book::{ConsistencyPolicy, EngineConfig};
use depth_feed::FeedSession;

/// Server greeting sent on connect
pub const INFO_MESSAGE: &str = r#"{"event":"info","version":1}"#;

/// Subscription confirmation for the bitcoin perpetual
pub const SUBSCRIBED_XBT: &str =
    r#"{"event":"subscribed","feed":"book_ui_1","product_ids":["PI_XBTUSD"]}"#;

/// Subscription confirmation for the ether perpetual
pub const SUBSCRIBED_ETH: &str =
    r#"{"event":"subscribed","feed":"book_ui_1","product_ids":["PI_ETHUSD"]}"#;

/// Unsubscribe confirmation for the bitcoin perpetual
pub const UNSUBSCRIBED_XBT: &str =
    r#"{"event":"unsubscribed","feed":"book_ui_1","product_ids":["PI_XBTUSD"]}"#;

/// Bitcoin snapshot with three levels per side
pub const SNAPSHOT_XBT: &str = r#"{
    "numLevels": 25,
    "feed": "book_ui_1_snapshot",
    "bids": [[50000.0, 1500.0], [49999.5, 2000.0], [49998.0, 500.0]],
    "asks": [[50000.5, 1000.0], [50001.0, 2500.0], [50003.5, 750.0]],
    "product_id": "PI_XBTUSD"
}"#;

/// Ether snapshot with two levels per side
pub const SNAPSHOT_ETH: &str = r#"{
    "numLevels": 25,
    "feed": "book_ui_1_snapshot",
    "bids": [[3000.0, 100.0], [2999.95, 200.0]],
    "asks": [[3000.05, 50.0], [3000.1, 150.0]],
    "product_id": "PI_ETHUSD"
}"#;

/// Bitcoin delta body for the given bids and asks JSON arrays
pub fn delta_xbt(bids: &str, asks: &str) -> String {
    format!(
        r#"{{"feed":"book_ui_1","product_id":"PI_XBTUSD","bids":{},"asks":{}}}"#,
        bids, asks
    )
}

/// Session that panics on any aggregation mismatch
pub fn session() -> FeedSession {
    let config = EngineConfig::builder()
        .consistency(ConsistencyPolicy::Fatal)
        .build();
    FeedSession::new(config).unwrap()
}
