//! Error types for the Rust Settlement Engine
//!
//! This module defines all error types that can occur while reading ledger
//! records, allocating invoices and maintaining event ledgers.
//!
//! # Error Categories
//!
//! - **Validation Errors**: malformed or out-of-range invoice input, always
//!   scoped to the offending field
//! - **Consistency Errors**: a sum reconciliation (consumptions or item totals
//!   against the invoice total) failed beyond the fixed tolerance
//! - **Ledger Errors**: references to events, invoices or participants that do
//!   not exist (or already exist)
//! - **File I/O and CSV Errors**: file not found, malformed rows, etc.

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the settlement engine
///
/// Every variant carries enough context to be reported to a user without
/// further lookups. Allocation never returns a partial result: the first
/// violated rule is reported and nothing is produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettlementError {
    /// Input file not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// This is a recoverable error - the malformed record is skipped
    /// and processing continues with the next record.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// Unknown record type in the `type` column
    #[error("Invalid record type '{record_type}'")]
    InvalidRecordType {
        /// The unrecognised record type
        record_type: String,
    },

    /// Malformed or out-of-range input for a single field
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Name of the offending input field (wire name, e.g. `totalAmount`)
        field: String,
        /// Human readable explanation
        message: String,
    },

    /// One or more participant ids are not part of the event (or invoice)
    #[error("Unknown participants in {field}: {}", ids.join(", "))]
    UnknownParticipants {
        /// Field that referenced the participants
        field: String,
        /// Every unknown id, in reference order
        ids: Vec<String>,
    },

    /// A sum reconciliation check failed beyond the 0.01 tolerance
    #[error("Sum of {field} ({actual:.2}) does not match total ({expected:.2})")]
    Consistency {
        /// Field whose values were summed
        field: String,
        /// The computed sum
        actual: Decimal,
        /// The invoice total it had to match
        expected: Decimal,
    },

    /// Checked money arithmetic left the representable range
    #[error("Arithmetic overflow in {operation} for {field}")]
    ArithmeticOverflow {
        /// Field whose value could not be computed
        field: String,
        /// The operation that overflowed
        operation: String,
    },

    /// Record references an event that was never declared
    #[error("Event '{event}' not found")]
    EventNotFound {
        /// Event id
        event: String,
    },

    /// Event declared twice
    #[error("Event '{event}' already exists")]
    DuplicateEvent {
        /// Event id
        event: String,
    },

    /// Participant id already registered in the event
    #[error("Participant '{participant}' already exists in event '{event}'")]
    DuplicateParticipant {
        /// Event id
        event: String,
        /// Participant id
        participant: String,
    },

    /// Participant is not registered in the event
    #[error("Participant '{participant}' not found in event '{event}'")]
    ParticipantNotFound {
        /// Event id
        event: String,
        /// Participant id
        participant: String,
    },

    /// Participant cannot be removed while invoices reference them
    #[error("Cannot remove participant '{participant}' from event '{event}': referenced by invoices")]
    ParticipantHasInvoices {
        /// Event id
        event: String,
        /// Participant id
        participant: String,
    },

    /// Invoice id is not part of the event
    #[error("Invoice '{invoice}' not found in event '{event}'")]
    InvoiceNotFound {
        /// Event id
        event: String,
        /// Invoice id
        invoice: String,
    },

    /// Invoice id already used in the event
    #[error("Invoice '{invoice}' already exists in event '{event}'")]
    DuplicateInvoice {
        /// Event id
        event: String,
        /// Invoice id
        invoice: String,
    },
}

// Conversion from io::Error to SettlementError
impl From<std::io::Error> for SettlementError {
    fn from(error: std::io::Error) -> Self {
        SettlementError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to SettlementError
impl From<csv::Error> for SettlementError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        SettlementError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for SettlementError {
    fn from(error: serde_json::Error) -> Self {
        SettlementError::IoError {
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl SettlementError {
    /// Create a field-scoped Validation error
    pub fn validation(field: &str, message: &str) -> Self {
        SettlementError::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    /// Create an UnknownParticipants error
    pub fn unknown_participants(field: &str, ids: Vec<String>) -> Self {
        SettlementError::UnknownParticipants {
            field: field.to_string(),
            ids,
        }
    }

    /// Create a Consistency error
    pub fn consistency(field: &str, actual: Decimal, expected: Decimal) -> Self {
        SettlementError::Consistency {
            field: field.to_string(),
            actual,
            expected,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn overflow(field: &str, operation: &str) -> Self {
        SettlementError::ArithmeticOverflow {
            field: field.to_string(),
            operation: operation.to_string(),
        }
    }

    /// Create a ParseError without line information
    pub fn parse(message: impl Into<String>) -> Self {
        SettlementError::ParseError {
            line: None,
            message: message.into(),
        }
    }

    /// Create an EventNotFound error
    pub fn event_not_found(event: &str) -> Self {
        SettlementError::EventNotFound {
            event: event.to_string(),
        }
    }

    /// Create an InvoiceNotFound error
    pub fn invoice_not_found(event: &str, invoice: &str) -> Self {
        SettlementError::InvoiceNotFound {
            event: event.to_string(),
            invoice: invoice.to_string(),
        }
    }

    /// Create a ParticipantNotFound error
    pub fn participant_not_found(event: &str, participant: &str) -> Self {
        SettlementError::ParticipantNotFound {
            event: event.to_string(),
            participant: participant.to_string(),
        }
    }

    /// Map a failure to open an input file
    pub fn open_failed(path: &std::path::Path, error: &std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => SettlementError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => SettlementError::IoError {
                message: format!("Failed to open file '{}': {}", path.display(), error),
            },
        }
    }

    /// Name of the input field this error is scoped to, if any
    ///
    /// Only validation, consistency and overflow errors are field-scoped.
    pub fn field(&self) -> Option<&str> {
        match self {
            SettlementError::Validation { field, .. }
            | SettlementError::UnknownParticipants { field, .. }
            | SettlementError::Consistency { field, .. }
            | SettlementError::ArithmeticOverflow { field, .. } => Some(field.as_str()),
            _ => None,
        }
    }

    /// Attach a line number to record-level errors
    ///
    /// Errors that already carry a line keep it; every other error is folded
    /// into a `ParseError` so readers can report where the row came from.
    pub fn at_line(self, line: u64) -> Self {
        match self {
            SettlementError::ParseError { line: None, message } => SettlementError::ParseError {
                line: Some(line),
                message,
            },
            SettlementError::ParseError { .. } => self,
            other => SettlementError::ParseError {
                line: Some(line),
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;

    #[rstest]
    #[case::file_not_found(
        SettlementError::FileNotFound { path: "ledger.csv".to_string() },
        "File not found: ledger.csv"
    )]
    #[case::parse_error_with_line(
        SettlementError::ParseError { line: Some(42), message: "Invalid field".to_string() },
        "CSV parse error at line 42: Invalid field"
    )]
    #[case::parse_error_without_line(
        SettlementError::ParseError { line: None, message: "Invalid field".to_string() },
        "CSV parse error: Invalid field"
    )]
    #[case::validation(
        SettlementError::validation("description", "Description is required"),
        "Invalid description: Description is required"
    )]
    #[case::unknown_participants(
        SettlementError::unknown_participants("participantIds", vec!["zoe".to_string(), "max".to_string()]),
        "Unknown participants in participantIds: zoe, max"
    )]
    #[case::consistency(
        SettlementError::consistency("consumptions", Decimal::new(8950, 2), Decimal::new(90, 0)),
        "Sum of consumptions (89.50) does not match total (90.00)"
    )]
    #[case::overflow(
        SettlementError::overflow("tipAmount", "total + tip"),
        "Arithmetic overflow in total + tip for tipAmount"
    )]
    #[case::participant_has_invoices(
        SettlementError::ParticipantHasInvoices { event: "trip".to_string(), participant: "ana".to_string() },
        "Cannot remove participant 'ana' from event 'trip': referenced by invoices"
    )]
    #[case::invoice_not_found(
        SettlementError::invoice_not_found("trip", "inv-9"),
        "Invoice 'inv-9' not found in event 'trip'"
    )]
    fn test_error_display(#[case] error: SettlementError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::validation(SettlementError::validation("tipAmount", "Tip amount must be >= 0"), Some("tipAmount"))]
    #[case::unknown(SettlementError::unknown_participants("birthdayPersonId", vec![]), Some("birthdayPersonId"))]
    #[case::consistency(SettlementError::consistency("items", Decimal::ONE, Decimal::TWO), Some("items"))]
    #[case::overflow(SettlementError::overflow("items[0]", "price * quantity"), Some("items[0]"))]
    #[case::ledger(SettlementError::event_not_found("trip"), None)]
    fn test_field_scope(#[case] error: SettlementError, #[case] expected: Option<&str>) {
        assert_eq!(error.field(), expected);
    }

    #[test]
    fn test_at_line_wraps_domain_errors() {
        let error = SettlementError::event_not_found("trip").at_line(7);
        assert_eq!(
            error,
            SettlementError::ParseError {
                line: Some(7),
                message: "Event 'trip' not found".to_string(),
            }
        );

        let already_located = SettlementError::ParseError {
            line: Some(3),
            message: "bad".to_string(),
        };
        assert_eq!(already_located.clone().at_line(9), already_located);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: SettlementError = io_error.into();
        assert!(matches!(error, SettlementError::IoError { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }
}
