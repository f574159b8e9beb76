//! Rust Settlement Engine CLI
//!
//! Command-line interface for settling shared expenses from CSV ledgers.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- ledger.csv > balances.csv
//! cargo run -- --report transfers ledger.csv > transfers.csv
//! cargo run -- --report summary ledger.csv > summary.json
//! cargo run -- --strategy sync ledger.csv > balances.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 ledger.csv > balances.csv
//! ```
//!
//! The report goes to stdout. Logs go to stderr and are filtered with
//! `RUST_LOG` (default `info`).
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, output not writable, etc.)

use rust_settlement_engine::cli;
use rust_settlement_engine::strategy;
use std::process;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();

    let args = cli::parse_args();

    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, config)
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, args.report, &mut output) {
        tracing::error!(error = %e, "settlement failed");
        process::exit(1);
    }
}
