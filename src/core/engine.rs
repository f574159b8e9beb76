//! Ledger processing engine
//!
//! This module provides the LedgerEngine that routes parsed records to the
//! book of the event they belong to.
//!
//! The engine enforces the stream-level rules:
//! - An event must be declared before any of its records
//! - An event is declared at most once
//! - Records of one event are applied in input order

use crate::core::event_book::EventBook;
use crate::types::{EventId, EventSummary, LedgerRecord, SettlementError};
use std::collections::HashMap;
use tracing::warn;

/// Single-threaded ledger engine
///
/// Owns one [`EventBook`] per declared event.
#[derive(Debug, Default)]
pub struct LedgerEngine {
    books: HashMap<EventId, EventBook>,
}

impl LedgerEngine {
    /// Create an engine with no events
    pub fn new() -> Self {
        LedgerEngine {
            books: HashMap::new(),
        }
    }

    /// Process a single ledger record
    ///
    /// # Arguments
    ///
    /// * `record` - The parsed record to apply
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the record was applied
    /// * `Err(SettlementError)` if the record was rejected
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The record declares an event that already exists
    /// - The record belongs to an event that was never declared
    /// - The event's book rejects the record
    pub fn process(&mut self, record: LedgerRecord) -> Result<(), SettlementError> {
        if let LedgerRecord::Event(event) = record {
            if self.books.contains_key(&event.id) {
                return Err(SettlementError::DuplicateEvent { event: event.id });
            }
            self.books.insert(event.id.clone(), EventBook::new(event));
            return Ok(());
        }

        let book = self
            .books
            .get_mut(record.event_id())
            .ok_or_else(|| SettlementError::event_not_found(record.event_id()))?;
        book.apply(record)
    }

    /// Number of declared events
    pub fn event_count(&self) -> usize {
        self.books.len()
    }

    /// Close every book and settle every event
    ///
    /// # Returns
    ///
    /// One summary per event, sorted by event id. An event whose balances
    /// cannot be computed is logged and left out.
    pub fn finish(self) -> Vec<EventSummary> {
        let mut summaries: Vec<EventSummary> = self
            .books
            .into_iter()
            .filter_map(|(event_id, book)| match book.settle() {
                Ok(summary) => Some(summary),
                Err(error) => {
                    warn!(event = %event_id, %error, "event not settled");
                    None
                }
            })
            .collect();
        summaries.sort_by(|a, b| a.event.id.cmp(&b.event.id));
        summaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Currency, Event, Participant};

    fn declare(id: &str) -> LedgerRecord {
        LedgerRecord::Event(Event::new(id, "Event", Currency::Cop).unwrap())
    }

    fn join(event: &str, id: &str) -> LedgerRecord {
        LedgerRecord::Participant {
            event: event.to_string(),
            participant: Participant::new(id, id).unwrap(),
        }
    }

    #[test]
    fn test_records_for_undeclared_event_are_rejected() {
        let mut engine = LedgerEngine::new();
        let err = engine.process(join("trip", "ana")).unwrap_err();
        assert_eq!(err, SettlementError::event_not_found("trip"));
    }

    #[test]
    fn test_duplicate_event_is_rejected() {
        let mut engine = LedgerEngine::new();
        engine.process(declare("trip")).unwrap();
        assert!(matches!(
            engine.process(declare("trip")),
            Err(SettlementError::DuplicateEvent { .. })
        ));
        assert_eq!(engine.event_count(), 1);
    }

    #[test]
    fn test_finish_sorts_events_by_id() {
        let mut engine = LedgerEngine::new();
        for id in ["zeta", "alpha", "mid"] {
            engine.process(declare(id)).unwrap();
            engine.process(join(id, "ana")).unwrap();
        }

        let ids: Vec<String> = engine
            .finish()
            .into_iter()
            .map(|summary| summary.event.id)
            .collect();
        assert_eq!(ids, vec!["alpha", "mid", "zeta"]);
    }
}
