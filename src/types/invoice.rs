//! Invoice-related types
//!
//! `InvoiceDraft` is the caller's request (already shaped, not yet
//! validated); `Invoice` is what the allocation calculator produces from it.
//! Per-participant values are kept as ordered lists so that the
//! remainder-to-last rounding rule is reproducible.

use super::error::SettlementError;
use super::event::{EventId, InvoiceId, ParticipantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered per-participant amounts (participant id, amount)
pub type Consumptions = Vec<(ParticipantId, Decimal)>;

/// How an invoice total is divided, as reported on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DivisionMethod {
    /// Even split across all participants
    Equal,
    /// Weighted by declared or item-derived consumption
    Consumption,
}

impl fmt::Display for DivisionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DivisionMethod::Equal => f.write_str("equal"),
            DivisionMethod::Consumption => f.write_str("consumption"),
        }
    }
}

impl FromStr for DivisionMethod {
    type Err = SettlementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "equal" => Ok(DivisionMethod::Equal),
            "consumption" => Ok(DivisionMethod::Consumption),
            _ => Err(SettlementError::validation(
                "divisionMethod",
                "Division method must be equal or consumption",
            )),
        }
    }
}

/// One itemized line as requested by the caller
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDraft {
    pub name: String,
    pub unit_price: Decimal,
    /// Signed so that non-positive quantities can be reported, not wrapped
    pub quantity: i64,
    /// Participants sharing this item, in split order
    pub participant_ids: Vec<ParticipantId>,
}

/// The division shape of an invoice
///
/// Plain consumption maps and itemized lists are mutually exclusive, and
/// itemization always implies the consumption method.
#[derive(Debug, Clone, PartialEq)]
pub enum Division {
    Equal,
    Consumption(Consumptions),
    Itemized(Vec<ItemDraft>),
}

impl Division {
    /// Build a division from the loose (method, consumptions, items) triple
    /// found on the wire
    ///
    /// # Errors
    ///
    /// - `items` with the equal method
    /// - `items` together with a consumption map
    /// - the consumption method with neither consumptions nor items
    pub fn from_parts(
        method: DivisionMethod,
        consumptions: Option<Consumptions>,
        items: Vec<ItemDraft>,
    ) -> Result<Self, SettlementError> {
        match (method, consumptions, items.is_empty()) {
            (DivisionMethod::Equal, _, true) => Ok(Division::Equal),
            (DivisionMethod::Equal, _, false) => Err(SettlementError::validation(
                "items",
                "Itemized invoices require the consumption division method",
            )),
            (DivisionMethod::Consumption, Some(_), false) => Err(SettlementError::validation(
                "items",
                "Items and consumptions cannot be combined",
            )),
            (DivisionMethod::Consumption, None, false) => Ok(Division::Itemized(items)),
            (DivisionMethod::Consumption, Some(map), true) => Ok(Division::Consumption(map)),
            (DivisionMethod::Consumption, None, true) => Err(SettlementError::validation(
                "consumptions",
                "Consumptions are required for consumption method",
            )),
        }
    }

    /// Wire-level division method
    pub fn method(&self) -> DivisionMethod {
        match self {
            Division::Equal => DivisionMethod::Equal,
            Division::Consumption(_) | Division::Itemized(_) => DivisionMethod::Consumption,
        }
    }
}

/// An invoice as requested by the caller
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
    pub id: InvoiceId,
    pub payer_id: ParticipantId,
    pub description: String,
    pub total_amount: Decimal,
    pub tip_amount: Decimal,
    /// Participants in split order; the payer is appended when absent
    pub participant_ids: Vec<ParticipantId>,
    pub division: Division,
    pub birthday_person_id: Option<ParticipantId>,
}

/// Share of one item owed by one participant
#[derive(Debug, Clone, PartialEq)]
pub struct ItemAssignment {
    pub participant_id: ParticipantId,
    pub amount: Decimal,
}

/// An allocated invoice line
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceItem {
    pub id: String,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i64,
    /// round2(unit_price × quantity)
    pub total: Decimal,
    /// Sums exactly to `total`
    pub assignments: Vec<ItemAssignment>,
}

impl InvoiceItem {
    /// Participants this item was split across, in split order
    pub fn participant_ids(&self) -> Vec<&str> {
        self.assignments
            .iter()
            .map(|a| a.participant_id.as_str())
            .collect()
    }
}

/// A participant's computed share of one invoice
#[derive(Debug, Clone, PartialEq)]
pub struct Participation {
    pub participant_id: ParticipantId,
    pub base_amount: Decimal,
    pub tip_share: Decimal,
    /// round2(base_amount + tip_share)
    pub final_amount: Decimal,
}

/// An allocated invoice
///
/// Only the allocation calculator builds these; the sum of
/// `participations[].final_amount` is exactly `amount_paid`.
#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub id: InvoiceId,
    pub event_id: EventId,
    pub payer_id: ParticipantId,
    pub description: String,
    pub total_amount: Decimal,
    pub tip_amount: Decimal,
    /// Amount credited to the payer: round2(total + tip)
    pub amount_paid: Decimal,
    pub division_method: DivisionMethod,
    pub birthday_person_id: Option<ParticipantId>,
    /// Effective consumption per participant (consumption method only)
    pub consumptions: Option<Consumptions>,
    /// Allocated items (itemized invoices only, otherwise empty)
    pub items: Vec<InvoiceItem>,
    pub participations: Vec<Participation>,
}

impl Invoice {
    /// Whether the participant pays for or shares this invoice
    pub fn references(&self, participant_id: &str) -> bool {
        self.payer_id == participant_id
            || self
                .participations
                .iter()
                .any(|p| p.participant_id == participant_id)
    }
}
