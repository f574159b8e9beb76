//! Rust Settlement Engine Library
//!
//! # Overview
//!
//! Splits shared invoices among event participants, aggregates everyone's
//! net balance and proposes the transfers that settle the event. Input is a
//! streaming CSV ledger processed by either a sync or an async strategy.
//!
//! # Architecture
//!
//! - [`types`] - Value types (Event, Invoice, Balance, Transfer, errors)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::item_splitter`] - Itemized lines into per-participant consumption
//!   - [`core::allocation`] - Invoice shares: base split, birthday gift, tip
//!   - [`core::balance_aggregator`] - Paid minus owed per participant
//!   - [`core::transfer_minimizer`] - Greedy creditor/debtor matching
//!   - [`core::ledger`] - One event's roster and invoices
//!   - [`core::engine`] - Record routing across events
//! - [`io`] - CSV input, CSV and JSON reports
//! - [`strategy`] - Sync and async pipelines
//!
//! # Money
//!
//! Amounts are [`rust_decimal::Decimal`] rounded to cents, halves away from
//! zero. Every split gives `round2(amount / n)` to all but the last
//! beneficiary, who receives the remainder, so shares always add up to the
//! amount being split.
//!
//! # Example
//!
//! ```
//! use rust_decimal::Decimal;
//! use rust_settlement_engine::core::EventLedger;
//! use rust_settlement_engine::types::{Currency, Division, Event, InvoiceDraft, Participant};
//!
//! let mut ledger = EventLedger::new(Event::new("trip", "Trip", Currency::Usd).unwrap());
//! for id in ["a", "b", "c"] {
//!     ledger.add_participant(Participant::new(id, id).unwrap()).unwrap();
//! }
//!
//! let invoice = ledger
//!     .record_invoice(&InvoiceDraft {
//!         id: "inv-1".to_string(),
//!         payer_id: "a".to_string(),
//!         description: "Dinner".to_string(),
//!         total_amount: Decimal::new(100, 0),
//!         tip_amount: Decimal::ZERO,
//!         participant_ids: vec!["a".to_string(), "b".to_string(), "c".to_string()],
//!         division: Division::Equal,
//!         birthday_person_id: None,
//!     })
//!     .unwrap();
//! assert_eq!(invoice.participations[2].final_amount, Decimal::new(3334, 2));
//!
//! let transfers = ledger.transfers().unwrap();
//! assert_eq!(transfers.len(), 2);
//! ```

pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use core::{AsyncLedgerEngine, EventLedger, LedgerEngine};
pub use io::{write_balances_csv, write_summary_json, write_transfers_csv};
pub use types::{
    Balance, BalanceStatus, Currency, Division, DivisionMethod, Event, EventSummary, Invoice,
    InvoiceDraft, ItemDraft, LedgerRecord, Participant, Participation, SettlementError, Transfer,
};
