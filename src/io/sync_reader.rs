//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over ledger records from a CSV file.
//! Delegates CSV format concerns to the csv_format module.
//!
//! ```no_run
//! use rust_settlement_engine::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("ledger.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(record) => println!("{:?}", record),
//!         Err(e) => eprintln!("{}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual record errors are yielded as Err variants carrying the line
//!   number of the offending row

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::{LedgerRecord, SettlementError};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Streaming reader over a ledger CSV file
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    /// Data rows consumed so far (the header is line 1)
    line_num: u64,
}

impl SyncReader {
    /// Open a ledger CSV file
    ///
    /// # Errors
    ///
    /// Returns `FileNotFound` if the path does not exist and `IoError` for
    /// any other failure to open it.
    pub fn new(path: &Path) -> Result<Self, SettlementError> {
        let file = File::open(path).map_err(|e| SettlementError::open_failed(path, &e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 1,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<LedgerRecord, SettlementError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<CsvRecord>();
        let row = deserializer.next()?;
        self.line_num += 1;

        let line = self.line_num;
        Some(
            row.map_err(SettlementError::from)
                .and_then(convert_csv_record)
                .map_err(|e| e.at_line(line)),
        )
    }
}
