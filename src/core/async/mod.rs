//! Asynchronous implementations of core components
//!
//! This module provides the thread-safe counterparts of the ledger engine,
//! using DashMap for locking.
//!
//! - **AsyncLedgerEngine**: event books in a DashMap, one entry per event
//! - **BatchProcessor**: partitions batches by event and runs each event in
//!   its own tokio task
//!
//! # Thread Safety
//!
//! - Records of different events are applied in parallel
//! - Records of the same event are applied in input order
//! - No global locks; locking is per event entry

pub mod batch_processor;
pub mod engine;

pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use engine::AsyncLedgerEngine;
