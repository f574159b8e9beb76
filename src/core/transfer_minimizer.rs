//! Transfer minimization
//!
//! Greedy largest-creditor / largest-debtor matching. Produces at most
//! `creditors + debtors - 1` transfers. It is a deterministic heuristic and
//! does not search for the minimum possible number of transfers.

use crate::core::money::{round2, CENT, SETTLE_THRESHOLD};
use crate::types::{Balance, ParticipantId, Transfer};
use rust_decimal::Decimal;

/// Turn net balances into transfers that zero every balance
///
/// Creditors are visited from the largest balance down and debtors from the
/// most negative up. Both sorts are stable, so ties keep roster order.
pub fn minimize_transfers(balances: &[Balance]) -> Vec<Transfer> {
    let mut creditors: Vec<(ParticipantId, Decimal)> = balances
        .iter()
        .filter(|b| b.net_balance > SETTLE_THRESHOLD)
        .map(|b| (b.participant_id.clone(), b.net_balance))
        .collect();
    let mut debtors: Vec<(ParticipantId, Decimal)> = balances
        .iter()
        .filter(|b| b.net_balance < -SETTLE_THRESHOLD)
        .map(|b| (b.participant_id.clone(), b.net_balance))
        .collect();

    creditors.sort_by(|a, b| b.1.cmp(&a.1));
    debtors.sort_by(|a, b| a.1.cmp(&b.1));

    let mut transfers = Vec::with_capacity(creditors.len() + debtors.len());
    let (mut c, mut d) = (0, 0);

    while c < creditors.len() && d < debtors.len() {
        let (creditor_id, credit) = &mut creditors[c];
        let (debtor_id, debt) = &mut debtors[d];

        let amount = round2(debt.abs().min(*credit));
        if amount > Decimal::ZERO {
            transfers.push(Transfer {
                from_participant_id: debtor_id.clone(),
                to_participant_id: creditor_id.clone(),
                amount,
            });
        }

        *debt = round2(*debt + amount);
        *credit = round2(*credit - amount);

        if debt.abs() < CENT {
            d += 1;
        }
        if credit.abs() < CENT {
            c += 1;
        }
    }

    transfers
}
