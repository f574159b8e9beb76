//! Ledger processing orchestration for async batch processing
//!
//! This module provides the `AsyncLedgerEngine` struct, the thread-safe
//! counterpart of [`LedgerEngine`](crate::core::LedgerEngine).
//!
//! # Architecture
//!
//! ```text
//! AsyncLedgerEngine
//!     └── DashMap<EventId, EventBook>  (one book per declared event)
//! ```
//!
//! # Thread Safety
//!
//! Each event's book lives in its own DashMap entry, so records of different
//! events can be applied from different tasks at the same time. Records of
//! one event must still be applied in input order; the batch processor
//! guarantees this by giving every event to a single task per batch.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::core::event_book::EventBook;
use crate::types::{EventId, EventSummary, LedgerRecord, SettlementError};

/// Thread-safe ledger engine
#[derive(Debug, Default)]
pub struct AsyncLedgerEngine {
    /// Open books keyed by event id
    books: DashMap<EventId, EventBook>,
}

impl AsyncLedgerEngine {
    /// Create an engine with no events
    pub fn new() -> Self {
        Self {
            books: DashMap::new(),
        }
    }

    /// Apply a single ledger record
    ///
    /// Holds the event's entry lock while the record is applied.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The record declares an event that already exists
    /// - The record belongs to an event that was never declared
    /// - The event's book rejects the record
    pub fn process_record(&self, record: LedgerRecord) -> Result<(), SettlementError> {
        if let LedgerRecord::Event(event) = record {
            return match self.books.entry(event.id.clone()) {
                Entry::Occupied(_) => Err(SettlementError::DuplicateEvent { event: event.id }),
                Entry::Vacant(slot) => {
                    slot.insert(EventBook::new(event));
                    Ok(())
                }
            };
        }

        match self.books.get_mut(record.event_id()) {
            Some(mut book) => book.value_mut().apply(record),
            None => Err(SettlementError::event_not_found(record.event_id())),
        }
    }

    /// Number of open books
    pub fn event_count(&self) -> usize {
        self.books.len()
    }

    /// Ids of every open book, sorted
    pub fn event_ids(&self) -> Vec<EventId> {
        let mut ids: Vec<EventId> = self.books.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Close an event's book and settle it
    ///
    /// # Returns
    ///
    /// `None` if the event has no open book (never declared or already settled),
    /// otherwise the settlement result of the book
    pub fn settle_event(&self, event_id: &str) -> Option<Result<EventSummary, SettlementError>> {
        self.books
            .remove(event_id)
            .map(|(_, book)| book.settle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Currency, Event, Participant};
    use std::sync::Arc;
    use std::thread;

    fn declare(id: &str) -> LedgerRecord {
        LedgerRecord::Event(Event::new(id, "Event", Currency::Usd).unwrap())
    }

    fn join(event: &str, id: &str) -> LedgerRecord {
        LedgerRecord::Participant {
            event: event.to_string(),
            participant: Participant::new(id, id).unwrap(),
        }
    }

    #[test]
    fn test_process_record_routes_to_event_book() {
        let engine = AsyncLedgerEngine::new();
        engine.process_record(declare("trip")).unwrap();
        engine.process_record(join("trip", "ana")).unwrap();

        let summary = engine.settle_event("trip").unwrap().unwrap();
        assert_eq!(summary.participants.len(), 1);
        assert_eq!(engine.event_count(), 0);
        assert!(engine.settle_event("trip").is_none());
    }

    #[test]
    fn test_undeclared_and_duplicate_events() {
        let engine = AsyncLedgerEngine::new();
        assert_eq!(
            engine.process_record(join("trip", "ana")),
            Err(SettlementError::event_not_found("trip"))
        );

        engine.process_record(declare("trip")).unwrap();
        assert!(matches!(
            engine.process_record(declare("trip")),
            Err(SettlementError::DuplicateEvent { .. })
        ));
    }

    #[test]
    fn test_events_can_be_filled_from_many_threads() {
        let engine = Arc::new(AsyncLedgerEngine::new());

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let engine = Arc::clone(&engine);
                thread::spawn(move || {
                    let event = format!("event-{}", n);
                    engine.process_record(declare(&event)).unwrap();
                    for p in 0..10 {
                        engine
                            .process_record(join(&event, &format!("p{}", p)))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let ids = engine.event_ids();
        assert_eq!(ids.len(), 8);
        assert_eq!(ids[0], "event-0");
        for id in ids {
            let summary = engine.settle_event(&id).unwrap().unwrap();
            assert_eq!(summary.participants.len(), 10);
        }
    }
}
