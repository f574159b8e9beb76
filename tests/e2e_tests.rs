//! End-to-end integration tests
//!
//! These tests validate the complete settlement pipeline using predefined
//! CSV fixtures. Each test:
//! 1. Reads input.csv from a fixture directory
//! 2. Applies every record and settles every event
//! 3. Writes the balances or transfers report
//! 4. Compares the report with expected_balances.csv or expected_transfers.csv
//!
//! Test fixtures are located in tests/fixtures/ and cover:
//! - Equal, consumption, itemized and birthday divisions
//! - Tip distribution and rounding drift
//! - Several interleaved events
//! - Amended, voided and rejected records
//! - Sub-cent totals, renamed participants and settled transfers
//!
//! Each fixture runs with both the synchronous and the async strategy.

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_settlement_engine::cli::{ReportKind, StrategyType};
    use rust_settlement_engine::strategy::create_strategy;
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use tempfile::NamedTempFile;

    fn expected_file(report: ReportKind) -> &'static str {
        match report {
            ReportKind::Balances => "expected_balances.csv",
            ReportKind::Transfers => "expected_transfers.csv",
            ReportKind::Summary => "expected_summary.json",
        }
    }

    /// Run a fixture and compare one report with its expected file
    ///
    /// # Panics
    ///
    /// Panics if:
    /// - Input or expected files cannot be read
    /// - The report doesn't match the expected file
    fn run_test_fixture(fixture_name: &str, strategy_type: StrategyType, report: ReportKind) {
        let fixture_dir = format!("tests/fixtures/{}", fixture_name);
        let input_path = format!("{}/input.csv", fixture_dir);
        let expected_path = format!("{}/{}", fixture_dir, expected_file(report));

        assert!(
            Path::new(&input_path).exists(),
            "Input file not found: {}",
            input_path
        );
        assert!(
            Path::new(&expected_path).exists(),
            "Expected file not found: {}",
            expected_path
        );

        let strategy = create_strategy(strategy_type.clone(), None);
        let mut temp_output = NamedTempFile::new().expect("Failed to create temp file");

        strategy
            .process(Path::new(&input_path), report, &mut temp_output)
            .unwrap_or_else(|e| panic!("Failed to settle ledger: {}", e));

        temp_output.flush().expect("Failed to flush temp file");

        let actual_output = fs::read_to_string(temp_output.path())
            .unwrap_or_else(|e| panic!("Failed to read temp output file: {}", e));
        let expected_output = fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("Failed to read expected file {}: {}", expected_path, e));

        assert_eq!(
            actual_output, expected_output,
            "\n\nOutput mismatch for fixture: {} (strategy: {:?}, report: {:?})\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture_name, strategy_type, report, actual_output, expected_output
        );
    }

    #[rstest]
    #[case("equal_split")]
    #[case("consumption_tip")]
    #[case("birthday")]
    #[case("itemized")]
    #[case("multiple_events")]
    #[case("rounding_drift")]
    #[case("rejected_records")]
    #[case("settled_transfers")]
    fn test_fixtures(
        #[case] fixture: &str,
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
        #[values(ReportKind::Balances, ReportKind::Transfers)] report: ReportKind,
    ) {
        run_test_fixture(fixture, strategy, report);
    }

    #[rstest]
    fn test_summary_report_is_valid_json(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        let strategy = create_strategy(strategy, None);
        let mut output = Vec::new();
        strategy
            .process(
                Path::new("tests/fixtures/birthday/input.csv"),
                ReportKind::Summary,
                &mut output,
            )
            .unwrap();

        let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
        let invoice = &json[0]["invoices"][0];
        assert_eq!(invoice["birthdayPersonId"], "ana");
        assert_eq!(invoice["participations"][0]["baseAmount"].as_f64(), Some(0.0));
        assert_eq!(invoice["participations"][0]["tipShare"].as_f64(), Some(2.0));
        assert_eq!(json[0]["transfers"].as_array().unwrap().len(), 2);
    }

    #[rstest]
    fn test_summary_lists_transfer_statuses(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        let strategy = create_strategy(strategy, None);
        let mut output = Vec::new();
        strategy
            .process(
                Path::new("tests/fixtures/settled_transfers/input.csv"),
                ReportKind::Summary,
                &mut output,
            )
            .unwrap();

        let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
        let event = &json[0];
        assert_eq!(event["participants"][1]["name"], "Benjamin");
        assert_eq!(event["transfers"][0]["isSettled"], true);
        assert_eq!(event["transfers"][1]["isSettled"], false);

        let statuses = event["transferStatuses"].as_array().unwrap();
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[1]["fromParticipantId"], "c");
        assert_eq!(statuses[1]["isSettled"], false);
    }

    #[test]
    fn test_missing_input_file_is_fatal() {
        let strategy = create_strategy(StrategyType::Sync, None);
        let mut output = Vec::new();
        let err = strategy
            .process(
                Path::new("tests/fixtures/does_not_exist.csv"),
                ReportKind::Balances,
                &mut output,
            )
            .unwrap_err();

        assert!(err.to_string().contains("does_not_exist.csv"));
        assert!(output.is_empty());
    }
}
