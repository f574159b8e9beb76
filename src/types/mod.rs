//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `event`: Events, participants and identifiers
//! - `invoice`: Invoice requests and allocated invoices
//! - `settlement`: Balances, transfers, transfer statuses and event summaries
//! - `record`: Parsed ledger input records
//! - `error`: Error types for the settlement engine

pub mod error;
pub mod event;
pub mod invoice;
pub mod record;
pub mod settlement;

pub use error::SettlementError;
pub use event::{Currency, Event, EventId, InvoiceId, Participant, ParticipantId};
pub use invoice::{
    Consumptions, Division, DivisionMethod, Invoice, InvoiceDraft, InvoiceItem, ItemAssignment,
    ItemDraft, Participation,
};
pub use record::{InvoiceHeader, LedgerRecord};
pub use settlement::{Balance, BalanceStatus, EventSummary, Transfer, TransferStatus};
