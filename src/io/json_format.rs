//! JSON summary report
//!
//! Serializes event summaries into the camelCase shapes API clients expect:
//! invoices with their participations and items, balances with
//! `totalShouldPay`, and transfers, each enriched with participant names.
//! Transfers carry `isSettled` from the recorded statuses, which are also
//! listed on their own under `transferStatuses`.

use crate::types::{
    BalanceStatus, DivisionMethod, EventSummary, Invoice, SettlementError,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EventDto<'a> {
    id: &'a str,
    name: &'a str,
    currency: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ParticipantDto<'a> {
    id: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ParticipationDto<'a> {
    participant_id: &'a str,
    participant_name: &'a str,
    base_amount: Decimal,
    tip_share: Decimal,
    final_amount: Decimal,
    is_birthday_person: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemDto<'a> {
    id: &'a str,
    name: &'a str,
    unit_price: Decimal,
    quantity: i64,
    total: Decimal,
    participant_ids: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InvoiceDto<'a> {
    id: &'a str,
    event_id: &'a str,
    payer_id: &'a str,
    payer_name: &'a str,
    description: &'a str,
    total_amount: Decimal,
    division_method: DivisionMethod,
    tip_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    birthday_person_id: Option<&'a str>,
    participations: Vec<ParticipationDto<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    items: Vec<ItemDto<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BalanceDto<'a> {
    participant_id: &'a str,
    participant_name: &'a str,
    total_paid: Decimal,
    total_should_pay: Decimal,
    net_balance: Decimal,
    status: BalanceStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransferDto<'a> {
    from_participant_id: &'a str,
    from_name: &'a str,
    to_participant_id: &'a str,
    to_name: &'a str,
    amount: Decimal,
    is_settled: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TransferStatusDto<'a> {
    from_participant_id: &'a str,
    to_participant_id: &'a str,
    is_settled: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDto<'a> {
    event: EventDto<'a>,
    participants: Vec<ParticipantDto<'a>>,
    invoices: Vec<InvoiceDto<'a>>,
    balances: Vec<BalanceDto<'a>>,
    transfers: Vec<TransferDto<'a>>,
    transfer_statuses: Vec<TransferStatusDto<'a>>,
}

fn invoice_dto<'a>(summary: &'a EventSummary, invoice: &'a Invoice) -> InvoiceDto<'a> {
    let birthday_person_id = invoice.birthday_person_id.as_deref();

    InvoiceDto {
        id: &invoice.id,
        event_id: &invoice.event_id,
        payer_id: &invoice.payer_id,
        payer_name: summary.participant_name(&invoice.payer_id),
        description: &invoice.description,
        total_amount: invoice.total_amount,
        division_method: invoice.division_method,
        tip_amount: invoice.tip_amount,
        birthday_person_id,
        participations: invoice
            .participations
            .iter()
            .map(|p| ParticipationDto {
                participant_id: &p.participant_id,
                participant_name: summary.participant_name(&p.participant_id),
                base_amount: p.base_amount,
                tip_share: p.tip_share,
                final_amount: p.final_amount,
                is_birthday_person: birthday_person_id == Some(p.participant_id.as_str()),
            })
            .collect(),
        items: invoice
            .items
            .iter()
            .map(|item| ItemDto {
                id: &item.id,
                name: &item.name,
                unit_price: item.unit_price,
                quantity: item.quantity,
                total: item.total,
                participant_ids: item.participant_ids(),
            })
            .collect(),
    }
}

fn summary_dto(summary: &EventSummary) -> SummaryDto<'_> {
    SummaryDto {
        event: EventDto {
            id: &summary.event.id,
            name: &summary.event.name,
            currency: summary.event.currency.code(),
        },
        participants: summary
            .participants
            .iter()
            .map(|p| ParticipantDto {
                id: &p.id,
                name: &p.name,
            })
            .collect(),
        invoices: summary
            .invoices
            .iter()
            .map(|invoice| invoice_dto(summary, invoice))
            .collect(),
        balances: summary
            .balances
            .iter()
            .map(|b| BalanceDto {
                participant_id: &b.participant_id,
                participant_name: summary.participant_name(&b.participant_id),
                total_paid: b.total_paid,
                total_should_pay: b.total_owed,
                net_balance: b.net_balance,
                status: b.status,
            })
            .collect(),
        transfers: summary
            .transfers
            .iter()
            .map(|t| TransferDto {
                from_participant_id: &t.from_participant_id,
                from_name: summary.participant_name(&t.from_participant_id),
                to_participant_id: &t.to_participant_id,
                to_name: summary.participant_name(&t.to_participant_id),
                amount: t.amount,
                is_settled: summary.is_settled(t),
            })
            .collect(),
        transfer_statuses: summary
            .transfer_statuses
            .iter()
            .map(|status| TransferStatusDto {
                from_participant_id: &status.from_participant_id,
                to_participant_id: &status.to_participant_id,
                is_settled: status.is_settled,
            })
            .collect(),
    }
}

/// Write every summary as one pretty-printed JSON array
///
/// # Errors
///
/// Returns `IoError` if serialization or writing fails.
pub fn write_summary_json(
    summaries: &[EventSummary],
    output: &mut dyn Write,
) -> Result<(), SettlementError> {
    let dtos: Vec<SummaryDto<'_>> = summaries.iter().map(summary_dto).collect();

    serde_json::to_writer_pretty(&mut *output, &dtos)?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}
