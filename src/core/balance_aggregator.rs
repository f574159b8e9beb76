//! Balance aggregation
//!
//! Folds every invoice of an event into one [`Balance`] per participant.
//! Balances are derived on every read and never stored.

use crate::core::money::{round2, CENT};
use crate::types::{Balance, BalanceStatus, Invoice, Participant, SettlementError};
use rust_decimal::Decimal;
use std::collections::HashMap;

#[derive(Default, Clone, Copy)]
struct Totals {
    paid: Decimal,
    owed: Decimal,
}

/// Compute the balance of every participant, in roster order
///
/// The payer of each invoice is credited with its `amount_paid`; every
/// participation is debited to its participant. Ids outside the roster are
/// ignored. An empty invoice list yields all-zero, settled balances.
///
/// # Errors
///
/// Returns `ArithmeticOverflow` when a participant's running total leaves
/// the `Decimal` range.
pub fn aggregate_balances(
    participants: &[Participant],
    invoices: &[Invoice],
) -> Result<Vec<Balance>, SettlementError> {
    let mut totals: HashMap<&str, Totals> = participants
        .iter()
        .map(|p| (p.id.as_str(), Totals::default()))
        .collect();

    for invoice in invoices {
        if let Some(payer) = totals.get_mut(invoice.payer_id.as_str()) {
            payer.paid = payer
                .paid
                .checked_add(invoice.amount_paid)
                .ok_or_else(|| SettlementError::overflow("totalPaid", "balance sum"))?;
        }
        for participation in &invoice.participations {
            if let Some(debtor) = totals.get_mut(participation.participant_id.as_str()) {
                debtor.owed = debtor
                    .owed
                    .checked_add(participation.final_amount)
                    .ok_or_else(|| SettlementError::overflow("totalShouldPay", "balance sum"))?;
            }
        }
    }

    let balances: Vec<Balance> = participants
        .iter()
        .map(|participant| {
            let Totals { paid, owed } = totals
                .get(participant.id.as_str())
                .copied()
                .unwrap_or_default();

            let mut net_balance = round2(paid - owed);
            if net_balance.abs() < CENT {
                net_balance = Decimal::ZERO;
            }

            Balance {
                participant_id: participant.id.clone(),
                total_paid: round2(paid),
                total_owed: round2(owed),
                net_balance,
                status: BalanceStatus::from_net(net_balance),
            }
        })
        .collect();

    Ok(balances)
}
