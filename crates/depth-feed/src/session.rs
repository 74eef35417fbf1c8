//! Feed session
//!
//! Routes decoded feed messages into a [`BookEngine`]: subscription changes
//! switch the instrument, snapshots replace the book and deltas update it.

use crate::error::{FeedError, FeedResult};
use crate::messages::{decode, BookMessage, FeedMessage};
use depth_book::{ApplyReport, BookEngine, DepthSnapshot, EngineConfig};
use depth_types::{BookError, Instrument};
use tracing::{debug, info, warn};

/// What handling one message did to the book
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Book cleared and moved to a new instrument
    Subscribed(Instrument),
    /// Book cleared, no active product
    Unsubscribed,
    /// Book replaced by a full snapshot
    Snapshot(ApplyReport),
    /// Book updated by a delta
    Delta(ApplyReport),
    /// Nothing changed
    Ignored,
}

impl SessionEvent {
    /// Check if the ladder may have changed
    pub fn changed_book(&self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// One book feed driving one engine
#[derive(Debug, Clone)]
pub struct FeedSession {
    engine: BookEngine,
    active: Option<Instrument>,
}

impl FeedSession {
    /// Create a session; the config is the template every product switch reuses
    pub fn new(config: EngineConfig) -> FeedResult<Self> {
        Ok(Self {
            engine: BookEngine::new(config)?,
            active: None,
        })
    }

    /// Get the engine
    pub fn engine(&self) -> &BookEngine {
        &self.engine
    }

    /// Instrument currently subscribed, if any
    pub fn active(&self) -> Option<Instrument> {
        self.active
    }

    /// Capture the grouped ladder
    pub fn snapshot(&self) -> DepthSnapshot {
        self.engine.snapshot()
    }

    /// Change the grouping size of the active book
    pub fn set_group_size(&mut self, tick: f64) -> FeedResult<()> {
        self.engine.set_group_size(tick)?;
        Ok(())
    }

    /// Decode and route one text frame
    pub fn handle(&mut self, text: &str) -> FeedResult<SessionEvent> {
        let message = decode(text)?;
        self.handle_message(message)
    }

    /// Route one decoded message
    pub fn handle_message(&mut self, message: FeedMessage) -> FeedResult<SessionEvent> {
        match message {
            FeedMessage::Subscribed { feed, product_ids } => {
                // Only the first product id drives the ladder
                let Some(product_id) = product_ids.first() else {
                    debug!("Subscribed to {} without product ids", feed);
                    return Ok(SessionEvent::Ignored);
                };
                let instrument = resolve(product_id)?;
                self.activate(instrument);
                Ok(SessionEvent::Subscribed(instrument))
            }
            FeedMessage::Unsubscribed { feed, product_ids } => {
                info!("Unsubscribed from {} for {:?}", feed, product_ids);
                self.engine.reset();
                self.active = None;
                Ok(SessionEvent::Unsubscribed)
            }
            FeedMessage::Info { version } => {
                info!("Server info: version {}", version.unwrap_or(0));
                Ok(SessionEvent::Ignored)
            }
            FeedMessage::Alert { message } => {
                warn!("Server alert: {}", message);
                Ok(SessionEvent::Ignored)
            }
            FeedMessage::Snapshot(book) => {
                let instrument = resolve(&book.product_id)?;
                if self.active != Some(instrument) {
                    self.activate(instrument);
                }
                self.engine.reset();
                debug!(
                    "Applying snapshot for {} ({:?} levels)",
                    instrument, book.num_levels
                );
                Ok(SessionEvent::Snapshot(self.apply(book)))
            }
            FeedMessage::Delta(book) => {
                let Some(active) = self.active else {
                    warn!("Delta for {} received before subscription", book.product_id);
                    return Ok(SessionEvent::Ignored);
                };
                if !active.product_id().eq_ignore_ascii_case(&book.product_id) {
                    debug!("Ignoring delta for inactive product {}", book.product_id);
                    return Ok(SessionEvent::Ignored);
                }
                Ok(SessionEvent::Delta(self.apply(book)))
            }
            FeedMessage::Other(name) => {
                debug!("Unhandled message: {}", name);
                Ok(SessionEvent::Ignored)
            }
        }
    }

    fn activate(&mut self, instrument: Instrument) {
        self.engine.switch_instrument(instrument);
        self.active = Some(instrument);
    }

    fn apply(&mut self, mut book: BookMessage) -> ApplyReport {
        for err in &book.rejected {
            warn!("Skipping entry for {}: {}", book.product_id, err);
        }
        let mut report = ApplyReport {
            errors: std::mem::take(&mut book.rejected),
            ..ApplyReport::default()
        };

        // Engine positions count only the entries that survived decoding
        let mut applied = self.engine.apply_delta(&book.page);
        for err in &mut applied.errors {
            if let BookError::MalformedLevel { side, index, .. } = err {
                *index = book.frame_index(*side, *index);
            }
        }
        report.merge(applied);
        report
    }
}

fn resolve(product_id: &str) -> FeedResult<Instrument> {
    Instrument::from_product_id(product_id)
        .ok_or_else(|| FeedError::UnknownProduct(product_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBSCRIBED_XBT: &str =
        r#"{"event":"subscribed","feed":"book_ui_1","product_ids":["PI_XBTUSD"]}"#;

    #[test]
    fn test_subscribe_activates_instrument() {
        let mut session = FeedSession::new(EngineConfig::default()).unwrap();
        assert_eq!(session.active(), None);

        let event = session.handle(SUBSCRIBED_XBT).unwrap();
        assert_eq!(event, SessionEvent::Subscribed(Instrument::XbtUsd));
        assert_eq!(session.active(), Some(Instrument::XbtUsd));
    }

    #[test]
    fn test_unknown_product() {
        let mut session = FeedSession::new(EngineConfig::default()).unwrap();
        let err = session
            .handle(r#"{"event":"subscribed","feed":"book_ui_1","product_ids":["PI_DOGEUSD"]}"#)
            .unwrap_err();
        assert!(matches!(err, FeedError::UnknownProduct(ref p) if p == "PI_DOGEUSD"));
        assert_eq!(session.active(), None);
    }

    #[test]
    fn test_delta_before_subscription_ignored() {
        let mut session = FeedSession::new(EngineConfig::default()).unwrap();
        let event = session
            .handle(r#"{"feed":"book_ui_1","product_id":"PI_XBTUSD","asks":[[100,1]]}"#)
            .unwrap();
        assert_eq!(event, SessionEvent::Ignored);
        assert!(!event.changed_book());
        assert!(session.snapshot().is_empty());
    }

    #[test]
    fn test_rejected_group_size() {
        let mut session = FeedSession::new(EngineConfig::default()).unwrap();
        assert!(matches!(
            session.set_group_size(0.1),
            Err(FeedError::Book(BookError::InvalidTickSize { .. }))
        ));
        assert!(session.set_group_size(2.5).is_ok());
    }
}
