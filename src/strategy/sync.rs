//! Synchronous processing strategy
//!
//! Single-threaded implementation of the ProcessingStrategy trait. It streams
//! records from `SyncReader` into a `LedgerEngine` one at a time and settles
//! every event once the input is exhausted.
//!
//! Memory usage is O(events + invoices), not O(rows).

use crate::core::LedgerEngine;
use crate::io::sync_reader::SyncReader;
use crate::strategy::ProcessingStrategy;
use crate::types::{EventSummary, SettlementError};
use std::path::Path;
use tracing::{info, warn};

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use rust_settlement_engine::cli::ReportKind;
/// use rust_settlement_engine::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy;
/// let mut output = io::stdout();
///
/// strategy
///     .process(Path::new("ledger.csv"), ReportKind::Balances, &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    fn settle(&self, input_path: &Path) -> Result<Vec<EventSummary>, SettlementError> {
        let mut engine = LedgerEngine::new();
        let reader = SyncReader::new(input_path)?;

        let (mut applied, mut rejected) = (0usize, 0usize);
        for result in reader {
            match result.and_then(|record| engine.process(record)) {
                Ok(()) => applied += 1,
                Err(e) => {
                    rejected += 1;
                    warn!(error = %e, "record rejected");
                }
            }
        }

        let summaries = engine.finish();
        info!(
            applied,
            rejected,
            events = summaries.len(),
            "ledger settled"
        );
        Ok(summaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    const HEADER: &str = "type,event,id,name,amount,tip,method,payer,participants,birthday,quantity,currency\n";

    #[test]
    fn test_sync_strategy_settles_itemized_invoice() {
        let file = create_temp_csv(&format!(
            "{}event,dinner,,Dinner,,,,,,,,EUR\n\
             participant,dinner,ana,Ana\n\
             participant,dinner,ben,Ben\n\
             invoice,dinner,inv-1,Tapas,45,5,consumption,ben,ana;ben\n\
             item,dinner,inv-1,Jamon,15,,,,ana,,2\n\
             item,dinner,inv-1,Bravas,15,,,,ana;ben,,1\n",
            HEADER
        ));

        let summaries = SyncProcessingStrategy.settle(file.path()).unwrap();
        let invoice = &summaries[0].invoices[0];
        let finals: Vec<Decimal> = invoice.participations.iter().map(|p| p.final_amount).collect();

        // ana: 30 + 7.50 + 2.50 tip, ben: 7.50 + 2.50 tip
        assert_eq!(finals, vec![Decimal::new(40, 0), Decimal::new(10, 0)]);
        assert_eq!(summaries[0].transfers[0].amount, Decimal::new(40, 0));
    }

    #[test]
    fn test_sync_strategy_continues_on_bad_records() {
        let file = create_temp_csv(&format!(
            "{}event,trip,,Trip,,,,,,,,COP\n\
             participant,trip,ana,Ana\n\
             participant,ghost,ben,Ben\n\
             invoice,trip,inv-1,Bus,oops,,equal,ana,ana\n\
             participant,trip,ben,Ben\n",
            HEADER
        ));

        let summaries = SyncProcessingStrategy.settle(file.path()).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].participants.len(), 2);
        assert!(summaries[0].invoices.is_empty());
    }

    #[test]
    fn test_sync_strategy_handles_missing_file() {
        let err = SyncProcessingStrategy
            .settle(Path::new("nonexistent.csv"))
            .unwrap_err();
        assert!(matches!(err, SettlementError::FileNotFound { .. }));
    }

    #[test]
    fn test_sync_strategy_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyncProcessingStrategy>();
    }
}
