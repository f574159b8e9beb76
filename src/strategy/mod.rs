//! Processing strategy module
//!
//! This module defines the Strategy pattern for complete settlement pipelines,
//! covering CSV parsing, record application and settlement. Different
//! implementations (synchronous, asynchronous batch) are selected at runtime
//! and produce identical summaries for the same input.

use crate::cli::{ReportKind, StrategyType};
use crate::io::{write_balances_csv, write_summary_json, write_transfers_csv};
use crate::types::{EventSummary, SettlementError};
use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete settlement pipelines
pub trait ProcessingStrategy: Send + Sync {
    /// Read every record from the input file and settle every event
    ///
    /// # Arguments
    ///
    /// * `input_path` - Path to the input CSV file containing ledger records
    ///
    /// # Returns
    ///
    /// One summary per declared event, sorted by event id
    ///
    /// # Errors
    ///
    /// Returns an error only for fatal problems: the input file cannot be
    /// opened, or the processing runtime cannot be started. Individual
    /// record errors are logged and processing continues with the next
    /// record.
    fn settle(&self, input_path: &Path) -> Result<Vec<EventSummary>, SettlementError>;

    /// Settle the input and write the selected report to output
    ///
    /// # Errors
    ///
    /// Returns an error if settling fails or the report cannot be written.
    fn process(
        &self,
        input_path: &Path,
        report: ReportKind,
        output: &mut dyn Write,
    ) -> Result<(), SettlementError> {
        let summaries = self.settle(input_path)?;
        write_report(&summaries, report, output)
    }
}

/// Write summaries in the requested report format
///
/// # Errors
///
/// Returns `IoError` if the output cannot be written.
pub fn write_report(
    summaries: &[EventSummary],
    report: ReportKind,
    output: &mut dyn Write,
) -> Result<(), SettlementError> {
    match report {
        ReportKind::Balances => write_balances_csv(summaries, output),
        ReportKind::Transfers => write_transfers_csv(summaries, output),
        ReportKind::Summary => write_summary_json(summaries, output),
    }
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `config` - Optional configuration for async batch processing (ignored for sync)
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    const LEDGER: &str = "type,event,id,name,amount,tip,method,payer,participants,birthday,quantity,currency\n\
        event,trip,,Trip,,,,,,,,USD\n\
        participant,trip,ana,Ana\n\
        participant,trip,ben,Ben\n\
        invoice,trip,inv-1,Fuel,40,,equal,ana,ana;ben\n";

    #[rstest]
    #[case::balances(ReportKind::Balances, "trip,ben,Ben,0.00,20.00,-20.00,debtor")]
    #[case::transfers(ReportKind::Transfers, "trip,ben,Ben,ana,Ana,20.00")]
    #[case::summary(ReportKind::Summary, "\"fromName\": \"Ben\"")]
    fn test_reports(
        #[case] report: ReportKind,
        #[case] expected_line: &str,
        #[values(StrategyType::Sync, StrategyType::Async)] strategy_type: StrategyType,
    ) {
        let file = create_temp_csv(LEDGER);
        let strategy = create_strategy(strategy_type, None);

        let mut output = Vec::new();
        strategy.process(file.path(), report, &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains(expected_line), "missing {:?} in {}", expected_line, text);
    }

    #[test]
    fn test_create_strategy_uses_config() {
        let strategy = create_strategy(StrategyType::Async, Some(BatchConfig::new(1, 2)));
        let file = create_temp_csv(LEDGER);

        let summaries = strategy.settle(file.path()).unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].transfers.len(), 1);
    }
}
