//! Feed decoding and session glue for the depth book engine
//!
//! This crate turns text frames of the `book_ui_1` feed into engine calls.
//! It owns no socket: the host reads frames from wherever it likes and hands
//! them to a [`FeedSession`].
//!
//! # Messages
//!
//! | Message | Effect |
//! |---------|--------|
//! | `{"event":"subscribed", ...}` | Switch instrument, clear the book |
//! | `{"event":"unsubscribed", ...}` | Clear the book, no active product |
//! | `{"feed":"book_ui_1_snapshot", ...}` | Replace the book |
//! | `{"feed":"book_ui_1", ...}` | Apply a delta to the active product |
//!
//! # Example
//!
//! ```
//! use depth_book::EngineConfig;
//! use depth_feed::{FeedSession, SessionEvent};
//!
//! let mut session = FeedSession::new(EngineConfig::default()).unwrap();
//! session
//!     .handle(r#"{"event":"subscribed","feed":"book_ui_1","product_ids":["PI_XBTUSD"]}"#)
//!     .unwrap();
//!
//! let event = session
//!     .handle(r#"{"feed":"book_ui_1","product_id":"PI_XBTUSD","bids":[[50000.0,10]]}"#)
//!     .unwrap();
//! assert!(matches!(event, SessionEvent::Delta(_)));
//! assert_eq!(session.snapshot().best_bid_price(), Some(50000.0));
//! ```

pub mod error;
pub mod messages;
pub mod session;
pub mod throttle;

// Re-export main types
pub use error::{FeedError, FeedResult};
pub use messages::{
    decode, BookMessage, FeedMessage, SubscriptionRequest, BOOK_FEED, BOOK_SNAPSHOT_FEED,
};
pub use session::{FeedSession, SessionEvent};
pub use throttle::{SnapshotThrottle, DEFAULT_THROTTLE};
