//! Settlement types
//!
//! Balances and transfers are derived on every read from an event's invoices
//! and are never stored as authoritative state.

use super::event::{Event, Participant, ParticipantId};
use super::invoice::Invoice;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a participant's net position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceStatus {
    /// Paid more than their share; is owed money
    Creditor,
    /// Paid less than their share; owes money
    Debtor,
    /// Net balance is zero
    Settled,
}

impl fmt::Display for BalanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BalanceStatus::Creditor => f.write_str("creditor"),
            BalanceStatus::Debtor => f.write_str("debtor"),
            BalanceStatus::Settled => f.write_str("settled"),
        }
    }
}

impl BalanceStatus {
    /// Classify a net balance that has already been snapped to cents
    pub fn from_net(net_balance: Decimal) -> Self {
        if net_balance > Decimal::ZERO {
            BalanceStatus::Creditor
        } else if net_balance < Decimal::ZERO {
            BalanceStatus::Debtor
        } else {
            BalanceStatus::Settled
        }
    }
}

/// A participant's paid-minus-owed position across an event
#[derive(Debug, Clone, PartialEq)]
pub struct Balance {
    pub participant_id: ParticipantId,
    pub total_paid: Decimal,
    pub total_owed: Decimal,
    /// round2(total_paid - total_owed), snapped to zero below one cent
    pub net_balance: Decimal,
    pub status: BalanceStatus,
}

/// A suggested direct payment from a debtor to a creditor
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub from_participant_id: ParticipantId,
    pub to_participant_id: ParticipantId,
    pub amount: Decimal,
}

/// Whether a debtor has marked a payment to a creditor as done
///
/// Statuses are keyed by the (from, to) pair and are independent of the
/// suggested transfers: a status survives even when later invoices change
/// or remove the transfer it was recorded against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferStatus {
    pub from_participant_id: ParticipantId,
    pub to_participant_id: ParticipantId,
    pub is_settled: bool,
}

/// Everything known about one event after settlement
#[derive(Debug, Clone, PartialEq)]
pub struct EventSummary {
    pub event: Event,
    pub participants: Vec<Participant>,
    pub invoices: Vec<Invoice>,
    pub balances: Vec<Balance>,
    pub transfers: Vec<Transfer>,
    /// Recorded statuses, in first-recorded order
    pub transfer_statuses: Vec<TransferStatus>,
}

impl EventSummary {
    /// Display name of a participant, empty when unknown
    pub fn participant_name(&self, participant_id: &str) -> &str {
        self.participants
            .iter()
            .find(|p| p.id == participant_id)
            .map(|p| p.name.as_str())
            .unwrap_or_default()
    }

    /// Whether the transfer between the pair was marked settled
    pub fn is_settled(&self, transfer: &Transfer) -> bool {
        self.transfer_statuses.iter().any(|status| {
            status.is_settled
                && status.from_participant_id == transfer.from_participant_id
                && status.to_participant_id == transfer.to_participant_id
        })
    }
}
