use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Allocate shared invoices and settle event balances
#[derive(Parser, Debug)]
#[command(name = "settlement-engine")]
#[command(about = "Allocate shared invoices and settle event balances", long_about = None)]
pub struct CliArgs {
    /// Ledger CSV: events, participants, invoices, items and settlements
    #[arg(value_name = "LEDGER")]
    pub input_file: PathBuf,

    /// How the ledger is read and applied
    #[arg(long, value_name = "STRATEGY", default_value = "async")]
    pub strategy: StrategyType,

    /// Records per batch handed to the event workers (async only)
    #[arg(long, value_name = "RECORDS")]
    pub batch_size: Option<usize>,

    /// Batches applied at the same time (async only, defaults to CPU cores)
    #[arg(long = "max-concurrent", value_name = "BATCHES")]
    pub max_concurrent_batches: Option<usize>,

    /// Report written to stdout
    #[arg(long, value_name = "REPORT", default_value = "balances")]
    pub report: ReportKind,
}

/// Ledger processing strategies
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    /// Apply records in file order on the calling thread
    Sync,
    /// Partition records by event and settle events concurrently
    Async,
}

/// Available output reports
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    /// One row per participant and event
    Balances,
    /// One row per suggested transfer, with its settled flag
    Transfers,
    /// Full event overviews as JSON
    Summary,
}

impl CliArgs {
    /// Batch settings for the async strategy
    ///
    /// Missing values take the defaults; zero values are replaced by the
    /// defaults with a logged warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        let default = BatchConfig::default();
        BatchConfig::new(
            self.batch_size.unwrap_or(default.batch_size),
            self.max_concurrent_batches
                .unwrap_or(default.max_concurrent_batches),
        )
    }
}
