//! Error types for feed decoding and session handling

use depth_types::BookError;

/// Errors that can occur while decoding or routing feed messages
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Product id with no tick-size table
    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    /// Well-formed JSON that is not a feed message
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Rejected by the book engine
    #[error("Book error: {0}")]
    Book(#[from] BookError),
}

impl FeedError {
    /// Check if the offending message can be dropped and the stream continued
    pub fn is_skippable(&self) -> bool {
        match self {
            Self::Json(_) | Self::InvalidMessage(_) | Self::UnknownProduct(_) => true,
            Self::Book(err) => err.is_validation(),
        }
    }
}

/// Result type for feed operations
pub type FeedResult<T> = Result<T, FeedError>;
