//! Batch processing with event-based partitioning
//!
//! This module provides the `BatchProcessor` struct, which applies batches of
//! ledger records concurrently while keeping every event's records in input
//! order.
//!
//! # Design
//!
//! A batch is partitioned by event id. Each event's slice of the batch is
//! applied sequentially inside its own tokio task, so different events make
//! progress in parallel. Batches themselves are processed one after another
//! by the caller, which keeps per-event ordering across batch boundaries.
//!
//! Settlement happens once the input is exhausted: every event is settled in
//! its own task and the summaries are returned sorted by event id.
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor
//!     └── Arc<AsyncLedgerEngine>  (shared event books)
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error, warn};

use super::AsyncLedgerEngine;
use crate::types::{EventId, EventSummary, LedgerRecord, SettlementError};

/// Outcome of applying one record
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// Event the record belonged to
    pub event: EventId,

    /// Whether the record was applied
    pub result: Result<(), SettlementError>,
}

/// Concurrent batch processor
///
/// Cloneable; clones share the same engine.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    engine: Arc<AsyncLedgerEngine>,
}

impl BatchProcessor {
    /// Create a processor over a shared engine
    pub fn new(engine: Arc<AsyncLedgerEngine>) -> Self {
        Self { engine }
    }

    /// Group a batch by event id, keeping input order within each event
    pub fn partition_by_event(&self, batch: Vec<LedgerRecord>) -> HashMap<EventId, Vec<LedgerRecord>> {
        let mut event_batches: HashMap<EventId, Vec<LedgerRecord>> = HashMap::new();

        for record in batch {
            event_batches
                .entry(record.event_id().to_string())
                .or_default()
                .push(record);
        }

        event_batches
    }

    /// Apply one event's records in order
    pub async fn process_event_records(&self, records: Vec<LedgerRecord>) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(records.len());

        for record in records {
            let event = record.event_id().to_string();
            let result = self.engine.process_record(record);
            results.push(ProcessingResult { event, result });
        }

        results
    }

    /// Apply a batch, one task per event
    ///
    /// Waits for every task before returning. A panicked task is logged and
    /// its results are lost.
    pub async fn process_batch(&self, batch: Vec<LedgerRecord>) -> Vec<ProcessingResult> {
        let event_batches = self.partition_by_event(batch);
        debug!(events = event_batches.len(), "processing batch");

        let mut tasks = Vec::with_capacity(event_batches.len());
        for (_event_id, records) in event_batches {
            let processor = self.clone();
            tasks.push(tokio::spawn(async move {
                processor.process_event_records(records).await
            }));
        }

        let mut results = Vec::new();
        for task in tasks {
            match task.await {
                Ok(event_results) => results.extend(event_results),
                Err(e) => error!(error = ?e, "event task panicked"),
            }
        }

        results
    }

    /// Settle every open event concurrently
    ///
    /// # Returns
    ///
    /// One summary per event, sorted by event id. An event whose balances
    /// cannot be computed is logged and left out.
    pub async fn settle_all(&self) -> Vec<EventSummary> {
        let tasks = self.engine.event_ids().into_iter().map(|event_id| {
            let engine = Arc::clone(&self.engine);
            tokio::spawn(async move { engine.settle_event(&event_id) })
        });

        let mut summaries = Vec::new();
        for outcome in join_all(tasks).await {
            match outcome {
                Ok(Some(Ok(summary))) => summaries.push(summary),
                Ok(Some(Err(error))) => warn!(%error, "event not settled"),
                Ok(None) => {}
                Err(e) => error!(error = ?e, "settlement task panicked"),
            }
        }

        summaries.sort_by(|a, b| a.event.id.cmp(&b.event.id));
        summaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Currency, DivisionMethod, Event, InvoiceHeader, Participant};
    use rust_decimal::Decimal;

    fn processor() -> BatchProcessor {
        BatchProcessor::new(Arc::new(AsyncLedgerEngine::new()))
    }

    fn declare(id: &str) -> LedgerRecord {
        LedgerRecord::Event(Event::new(id, "Event", Currency::Usd).unwrap())
    }

    fn join(event: &str, id: &str) -> LedgerRecord {
        LedgerRecord::Participant {
            event: event.to_string(),
            participant: Participant::new(id, id).unwrap(),
        }
    }

    fn invoice(event: &str, id: &str, payer: &str, total: i64) -> LedgerRecord {
        LedgerRecord::Invoice {
            event: event.to_string(),
            header: InvoiceHeader {
                id: id.to_string(),
                payer_id: payer.to_string(),
                description: "Taxi".to_string(),
                total_amount: Decimal::from(total),
                tip_amount: Decimal::ZERO,
                method: DivisionMethod::Equal,
                participant_ids: vec!["ana".to_string(), "ben".to_string()],
                consumptions: None,
                birthday_person_id: None,
            },
        }
    }

    #[test]
    fn test_partition_by_event_keeps_order() {
        let batch = vec![
            declare("a"),
            declare("b"),
            join("a", "ana"),
            join("b", "ben"),
            join("a", "cy"),
        ];
        let partitioned = processor().partition_by_event(batch);

        assert_eq!(partitioned.len(), 2);
        let a = &partitioned["a"];
        assert_eq!(a.len(), 3);
        assert!(matches!(a[0], LedgerRecord::Event(_)));
        assert!(matches!(&a[2], LedgerRecord::Participant { participant, .. } if participant.id == "cy"));
    }

    #[test]
    fn test_partition_empty_batch() {
        assert!(processor().partition_by_event(Vec::new()).is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_process_batch_reports_every_record() {
        let processor = processor();
        let results = processor
            .process_batch(vec![declare("a"), join("a", "ana"), join("zzz", "ben")])
            .await;

        assert_eq!(results.len(), 3);
        let failures: Vec<&ProcessingResult> = results.iter().filter(|r| r.result.is_err()).collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].event, "zzz");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_events_span_batches_in_order() {
        let processor = processor();
        processor
            .process_batch(vec![declare("a"), join("a", "ana"), declare("b")])
            .await;
        processor
            .process_batch(vec![join("a", "ben"), join("b", "ana"), join("b", "ben")])
            .await;
        processor
            .process_batch(vec![invoice("a", "inv-1", "ana", 50), invoice("b", "inv-1", "ben", 20)])
            .await;

        let summaries = processor.settle_all().await;
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].event.id, "a");
        assert_eq!(summaries[0].invoices.len(), 1);
        assert_eq!(summaries[0].transfers[0].amount, Decimal::from(25));
        assert_eq!(summaries[1].transfers[0].from_participant_id, "ana");
    }

    #[tokio::test]
    async fn test_settle_all_on_empty_engine() {
        assert!(processor().settle_all().await.is_empty());
    }
}
