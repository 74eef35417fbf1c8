//! Decoding of `book_ui_1` feed messages
//!
//! Book entries are decoded one at a time: an entry that is not a numeric
//! `[price, size]` pair is reported in [`BookMessage::rejected`] and the rest
//! of the page is kept.

use crate::error::{FeedError, FeedResult};
use depth_types::{BookError, BookPage, Level, Side};
use serde::Deserialize;
use serde_json::Value;

/// Grouped-book delta feed
pub const BOOK_FEED: &str = "book_ui_1";
/// Full-book message sent right after subscribing
pub const BOOK_SNAPSHOT_FEED: &str = "book_ui_1_snapshot";

/// One book message, snapshot or delta
#[derive(Debug, Clone, PartialEq)]
pub struct BookMessage {
    /// Product id as sent by the feed
    pub product_id: String,
    /// Usable entries
    pub page: BookPage,
    /// Entries that could not be decoded
    pub rejected: Vec<BookError>,
    /// Depth advertised by a snapshot
    pub num_levels: Option<usize>,
    /// Frame position of each bid kept in `page`
    pub bid_positions: Vec<usize>,
    /// Frame position of each ask kept in `page`
    pub ask_positions: Vec<usize>,
}

impl BookMessage {
    /// Position in the original frame of entry `index` of `page`
    pub fn frame_index(&self, side: Side, index: usize) -> usize {
        let positions = match side {
            Side::Bid => &self.bid_positions,
            Side::Ask => &self.ask_positions,
        };
        positions.get(index).copied().unwrap_or(index)
    }
}

/// Decoded feed message
#[derive(Debug, Clone, PartialEq)]
pub enum FeedMessage {
    /// Subscription confirmed
    Subscribed {
        /// Feed name
        feed: String,
        /// Product ids covered
        product_ids: Vec<String>,
    },
    /// Subscription dropped
    Unsubscribed {
        /// Feed name
        feed: String,
        /// Product ids covered
        product_ids: Vec<String>,
    },
    /// Server greeting
    Info {
        /// Protocol version
        version: Option<u64>,
    },
    /// Server-side error or alert
    Alert {
        /// Message text
        message: String,
    },
    /// Full book
    Snapshot(BookMessage),
    /// Incremental update
    Delta(BookMessage),
    /// Event or feed this crate does not handle
    Other(String),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    event: Option<String>,
    feed: Option<String>,
    product_id: Option<String>,
    product_ids: Option<Vec<String>>,
    #[serde(rename = "numLevels")]
    num_levels: Option<usize>,
    bids: Option<Vec<Value>>,
    asks: Option<Vec<Value>>,
    version: Option<u64>,
    message: Option<String>,
}

/// Subscribe/unsubscribe request for the book feed
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionRequest {
    /// Event type
    pub event: String,
    /// Feed name
    pub feed: String,
    /// Product IDs
    pub product_ids: Vec<String>,
}

impl SubscriptionRequest {
    /// Create a subscribe request for the book feed
    pub fn subscribe(product_ids: Vec<String>) -> Self {
        Self {
            event: "subscribe".to_string(),
            feed: BOOK_FEED.to_string(),
            product_ids,
        }
    }

    /// Create an unsubscribe request for the book feed
    pub fn unsubscribe(product_ids: Vec<String>) -> Self {
        Self {
            event: "unsubscribe".to_string(),
            feed: BOOK_FEED.to_string(),
            product_ids,
        }
    }

    /// Convert to JSON
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "event": self.event,
            "feed": self.feed,
            "product_ids": self.product_ids
        })
    }
}

/// Decode one text frame
pub fn decode(text: &str) -> FeedResult<FeedMessage> {
    let envelope: Envelope = serde_json::from_str(text)?;

    if let Some(event) = envelope.event {
        let feed = envelope.feed.unwrap_or_default();
        let product_ids = envelope.product_ids.unwrap_or_default();
        return Ok(match event.as_str() {
            "subscribed" => FeedMessage::Subscribed { feed, product_ids },
            "unsubscribed" => FeedMessage::Unsubscribed { feed, product_ids },
            "info" => FeedMessage::Info {
                version: envelope.version,
            },
            "error" | "alert" => FeedMessage::Alert {
                message: envelope
                    .message
                    .unwrap_or_else(|| "Unknown error".to_string()),
            },
            _ => FeedMessage::Other(event),
        });
    }

    let Some(feed) = envelope.feed else {
        return Err(FeedError::InvalidMessage(
            "message has neither event nor feed".to_string(),
        ));
    };
    if feed != BOOK_FEED && feed != BOOK_SNAPSHOT_FEED {
        return Ok(FeedMessage::Other(feed));
    }

    let product_id = envelope
        .product_id
        .ok_or_else(|| FeedError::InvalidMessage(format!("{} message without product_id", feed)))?;

    let mut rejected = Vec::new();
    let mut page = BookPage::new();
    let mut bid_positions = Vec::new();
    let mut ask_positions = Vec::new();
    if let Some(entries) = envelope.bids {
        let (levels, positions) = decode_side(Side::Bid, &entries, &mut rejected);
        page.bids = Some(levels);
        bid_positions = positions;
    }
    if let Some(entries) = envelope.asks {
        let (levels, positions) = decode_side(Side::Ask, &entries, &mut rejected);
        page.asks = Some(levels);
        ask_positions = positions;
    }

    let message = BookMessage {
        product_id,
        page,
        rejected,
        num_levels: envelope.num_levels,
        bid_positions,
        ask_positions,
    };
    Ok(if feed == BOOK_SNAPSHOT_FEED {
        FeedMessage::Snapshot(message)
    } else {
        FeedMessage::Delta(message)
    })
}

/// Decoded levels and the frame position of each
fn decode_side(
    side: Side,
    entries: &[Value],
    rejected: &mut Vec<BookError>,
) -> (Vec<Level>, Vec<usize>) {
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| match decode_entry(entry) {
            Ok(level) => Some((level, index)),
            Err(reason) => {
                rejected.push(BookError::malformed(side, index, entry.to_string(), reason));
                None
            }
        })
        .unzip()
}

fn decode_entry(entry: &Value) -> Result<Level, &'static str> {
    let pair = match entry.as_array() {
        Some(pair) if pair.len() >= 2 => pair,
        _ => return Err("entry is not a [price, size] pair"),
    };
    let price = number(&pair[0]).ok_or("price is not a number")?;
    let size = number(&pair[1]).ok_or("size is not a number")?;
    Ok(Level::new(price, size))
}

/// Accept JSON numbers and numeric strings
fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
