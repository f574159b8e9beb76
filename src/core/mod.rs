//! Core business logic module
//!
//! - `money` - Cent rounding and the divide-with-remainder rule
//! - `traits` - Participant existence check used by the allocator
//! - `item_splitter` - Splits itemized invoice lines across participants
//! - `allocation` - Computes every participant's share of an invoice
//! - `balance_aggregator` - Folds invoices into per-participant balances
//! - `transfer_minimizer` - Turns balances into settling transfers
//! - `ledger` - One event's roster and invoices
//! - `event_book` - Applies parsed records to an event ledger
//! - `engine` - Single-threaded record routing
//! - `async` - Concurrent record routing

pub mod allocation;
pub mod r#async;
pub mod balance_aggregator;
pub mod engine;
pub mod event_book;
pub mod item_splitter;
pub mod ledger;
pub mod money;
pub mod traits;
pub mod transfer_minimizer;

pub use allocation::allocate;
pub use balance_aggregator::aggregate_balances;
pub use engine::LedgerEngine;
pub use event_book::EventBook;
pub use item_splitter::{split_items, ItemSplit};
pub use ledger::EventLedger;
pub use r#async::{AsyncLedgerEngine, BatchProcessor};
pub use traits::ParticipantDirectory;
pub use transfer_minimizer::minimize_transfers;
