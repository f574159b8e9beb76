//! CSV format handling for ledger records and settlement reports
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to domain types
//! - Balance and transfer report serialization
//!
//! All functions are pure (no file I/O) for easy testing.
//!
//! # Input columns
//!
//! `type,event,id,name,amount,tip,method,payer,participants,birthday,quantity,currency`
//!
//! Which columns a row uses depends on its type; unused columns may be left
//! empty or omitted at the end of the row. `rename` rows carry the
//! participant in `id` and the new name in `name`; `settle` and `unsettle`
//! rows carry the paying debtor in `id` and the receiving creditor in `name`.

use crate::types::{
    Consumptions, Currency, DivisionMethod, Event, EventSummary, InvoiceHeader, ItemDraft,
    LedgerRecord, Participant, ParticipantId, SettlementError,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt::Display;
use std::io::Write;
use std::str::FromStr;

/// Raw CSV row, before conversion
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct CsvRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default)]
    pub event: String,
    pub id: Option<String>,
    pub name: Option<String>,
    pub amount: Option<String>,
    pub tip: Option<String>,
    pub method: Option<String>,
    pub payer: Option<String>,
    pub participants: Option<String>,
    pub birthday: Option<String>,
    pub quantity: Option<String>,
    pub currency: Option<String>,
}

/// Convert a raw CSV row into a ledger record
///
/// # Errors
///
/// Returns an error if:
/// - The record type is unknown
/// - A required column is missing or blank
/// - An amount or quantity does not parse
/// - An event or participant fails its own validation
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<LedgerRecord, SettlementError> {
    let event = csv_record.event.trim().to_string();
    if event.is_empty() {
        return Err(SettlementError::validation("eventId", "Event id is required"));
    }

    match csv_record.record_type.trim().to_lowercase().as_str() {
        "event" => {
            let currency = Currency::from_str(text(&csv_record.currency))?;
            Ok(LedgerRecord::Event(Event::new(
                &event,
                text(&csv_record.name),
                currency,
            )?))
        }
        "participant" => {
            let id = required(&csv_record.id, "participantId", "Participant id is required")?;
            let participant = Participant::new(id, text(&csv_record.name))?;
            Ok(LedgerRecord::Participant { event, participant })
        }
        "invoice" => Ok(LedgerRecord::Invoice {
            event,
            header: convert_header(&csv_record)?,
        }),
        "amend" => Ok(LedgerRecord::Amend {
            event,
            header: convert_header(&csv_record)?,
        }),
        "item" => {
            let invoice = required(&csv_record.id, "invoiceId", "Invoice id is required")?;
            let unit_price = parse_amount(&csv_record.amount, "unitPrice")?.ok_or_else(|| {
                SettlementError::validation("unitPrice", "Unit price is required")
            })?;
            let quantity = parse_quantity(&csv_record.quantity)?;
            let (participant_ids, _) = parse_participants(text(&csv_record.participants))?;

            Ok(LedgerRecord::Item {
                event,
                invoice: invoice.to_string(),
                item: ItemDraft {
                    name: text(&csv_record.name).to_string(),
                    unit_price,
                    quantity,
                    participant_ids,
                },
            })
        }
        "void" => {
            let invoice = required(&csv_record.id, "invoiceId", "Invoice id is required")?;
            Ok(LedgerRecord::Void {
                event,
                invoice: invoice.to_string(),
            })
        }
        "leave" => {
            let participant =
                required(&csv_record.id, "participantId", "Participant id is required")?;
            Ok(LedgerRecord::Leave {
                event,
                participant: participant.to_string(),
            })
        }
        "rename" => {
            let participant =
                required(&csv_record.id, "participantId", "Participant id is required")?;
            let name = required(&csv_record.name, "name", "Name is required")?;
            Ok(LedgerRecord::Rename {
                event,
                participant: participant.to_string(),
                name: name.to_string(),
            })
        }
        kind @ ("settle" | "unsettle") => {
            let from = required(&csv_record.id, "fromParticipantId", "Debtor is required")?;
            let to = required(&csv_record.name, "toParticipantId", "Creditor is required")?;
            Ok(LedgerRecord::Settle {
                event,
                from: from.to_string(),
                to: to.to_string(),
                is_settled: kind == "settle",
            })
        }
        _ => Err(SettlementError::InvalidRecordType {
            record_type: csv_record.record_type,
        }),
    }
}

/// Build an invoice header from an `invoice` or `amend` row
fn convert_header(csv_record: &CsvRecord) -> Result<InvoiceHeader, SettlementError> {
    let id = required(&csv_record.id, "invoiceId", "Invoice id is required")?;
    let total_amount = parse_amount(&csv_record.amount, "totalAmount")?.ok_or_else(|| {
        SettlementError::validation("totalAmount", "Total amount is required")
    })?;
    let tip_amount = parse_amount(&csv_record.tip, "tipAmount")?.unwrap_or(Decimal::ZERO);
    let method = DivisionMethod::from_str(text(&csv_record.method))?;
    let (participant_ids, consumptions) = parse_participants(text(&csv_record.participants))?;

    // consumption amounts only mean something under the consumption method
    let consumptions = match method {
        DivisionMethod::Equal => None,
        DivisionMethod::Consumption => consumptions,
    };

    let birthday_person_id = Some(text(&csv_record.birthday))
        .filter(|id| !id.is_empty())
        .map(str::to_string);

    Ok(InvoiceHeader {
        id: id.to_string(),
        payer_id: text(&csv_record.payer).to_string(),
        description: text(&csv_record.name).to_string(),
        total_amount,
        tip_amount,
        method,
        participant_ids,
        consumptions,
        birthday_person_id,
    })
}

/// Trimmed column value, empty when absent
fn text(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or_default()
}

fn required<'a>(
    value: &'a Option<String>,
    field: &str,
    message: &str,
) -> Result<&'a str, SettlementError> {
    match text(value) {
        "" => Err(SettlementError::validation(field, message)),
        present => Ok(present),
    }
}

/// Parse an optional decimal column
fn parse_amount(value: &Option<String>, field: &str) -> Result<Option<Decimal>, SettlementError> {
    match text(value) {
        "" => Ok(None),
        raw => Decimal::from_str(raw)
            .map(Some)
            .map_err(|_| SettlementError::parse(format!("Invalid {} '{}'", field, raw))),
    }
}

fn parse_quantity(value: &Option<String>) -> Result<i64, SettlementError> {
    match text(value) {
        "" => Err(SettlementError::validation("quantity", "Quantity is required")),
        raw => raw
            .parse::<i64>()
            .map_err(|_| SettlementError::parse(format!("Invalid quantity '{}'", raw))),
    }
}

/// Parse a `;`-separated participant list
///
/// Entries are `id` or `id:amount`. Returns every id in order, and the
/// consumption map when at least one entry carries an amount.
pub fn parse_participants(
    value: &str,
) -> Result<(Vec<ParticipantId>, Option<Consumptions>), SettlementError> {
    let mut ids = Vec::new();
    let mut consumptions: Consumptions = Vec::new();

    for entry in value.split(';').map(str::trim).filter(|e| !e.is_empty()) {
        match entry.split_once(':') {
            Some((id, amount)) => {
                let id = id.trim();
                let amount = amount.trim();
                let amount = Decimal::from_str(amount).map_err(|_| {
                    SettlementError::parse(format!("Invalid consumption '{}' for {}", amount, id))
                })?;
                ids.push(id.to_string());
                consumptions.push((id.to_string(), amount));
            }
            None => ids.push(entry.to_string()),
        }
    }

    let consumptions = if consumptions.is_empty() {
        None
    } else {
        Some(consumptions)
    };
    Ok((ids, consumptions))
}

fn write_error(context: &str, error: impl Display) -> SettlementError {
    SettlementError::IoError {
        message: format!("{}: {}", context, error),
    }
}

/// Write one balance row per participant of every event
///
/// Columns: `event,participant,name,total_paid,total_should_pay,net_balance,status`.
/// Summaries are written in the order given.
///
/// # Errors
///
/// Returns `IoError` if the output cannot be written.
pub fn write_balances_csv(
    summaries: &[EventSummary],
    output: &mut dyn Write,
) -> Result<(), SettlementError> {
    let mut writer = csv::Writer::from_writer(output);

    writer
        .write_record([
            "event",
            "participant",
            "name",
            "total_paid",
            "total_should_pay",
            "net_balance",
            "status",
        ])
        .map_err(|e| write_error("Failed to write CSV header", e))?;

    for summary in summaries {
        for balance in &summary.balances {
            writer
                .write_record(&[
                    summary.event.id.clone(),
                    balance.participant_id.clone(),
                    summary.participant_name(&balance.participant_id).to_string(),
                    format!("{:.2}", balance.total_paid),
                    format!("{:.2}", balance.total_owed),
                    format!("{:.2}", balance.net_balance),
                    balance.status.to_string(),
                ])
                .map_err(|e| write_error("Failed to write balance record", e))?;
        }
    }

    writer
        .flush()
        .map_err(|e| write_error("Failed to flush output", e))
}

/// Write every suggested transfer of every event
///
/// Columns: `event,from,from_name,to,to_name,amount,settled`.
///
/// # Errors
///
/// Returns `IoError` if the output cannot be written.
pub fn write_transfers_csv(
    summaries: &[EventSummary],
    output: &mut dyn Write,
) -> Result<(), SettlementError> {
    let mut writer = csv::Writer::from_writer(output);

    writer
        .write_record(["event", "from", "from_name", "to", "to_name", "amount", "settled"])
        .map_err(|e| write_error("Failed to write CSV header", e))?;

    for summary in summaries {
        for transfer in &summary.transfers {
            writer
                .write_record(&[
                    summary.event.id.clone(),
                    transfer.from_participant_id.clone(),
                    summary.participant_name(&transfer.from_participant_id).to_string(),
                    transfer.to_participant_id.clone(),
                    summary.participant_name(&transfer.to_participant_id).to_string(),
                    format!("{:.2}", transfer.amount),
                    summary.is_settled(transfer).to_string(),
                ])
                .map_err(|e| write_error("Failed to write transfer record", e))?;
        }
    }

    writer
        .flush()
        .map_err(|e| write_error("Failed to flush output", e))
}
