//! Ledger record types
//!
//! A ledger input is a stream of typed records. Each record belongs to
//! exactly one event, which is what the async pipeline partitions on.

use super::error::SettlementError;
use super::event::{Event, EventId, InvoiceId, Participant, ParticipantId};
use super::invoice::{Consumptions, Division, DivisionMethod, InvoiceDraft, ItemDraft};
use rust_decimal::Decimal;

/// Invoice fields as they appear on an `invoice`/`amend` row
///
/// Items arrive on later rows, so the division shape is only known once the
/// header is closed with [`InvoiceHeader::into_draft`].
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceHeader {
    pub id: InvoiceId,
    pub payer_id: ParticipantId,
    pub description: String,
    pub total_amount: Decimal,
    pub tip_amount: Decimal,
    pub method: DivisionMethod,
    pub participant_ids: Vec<ParticipantId>,
    pub consumptions: Option<Consumptions>,
    pub birthday_person_id: Option<ParticipantId>,
}

impl InvoiceHeader {
    /// Close the header with the items collected for it
    pub fn into_draft(self, items: Vec<ItemDraft>) -> Result<InvoiceDraft, SettlementError> {
        let division = Division::from_parts(self.method, self.consumptions, items)?;

        Ok(InvoiceDraft {
            id: self.id,
            payer_id: self.payer_id,
            description: self.description,
            total_amount: self.total_amount,
            tip_amount: self.tip_amount,
            participant_ids: self.participant_ids,
            division,
            birthday_person_id: self.birthday_person_id,
        })
    }
}

/// One parsed input record
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerRecord {
    /// Declare an event
    Event(Event),
    /// Register a participant in an event
    Participant {
        event: EventId,
        participant: Participant,
    },
    /// Create an invoice
    Invoice {
        event: EventId,
        header: InvoiceHeader,
    },
    /// Replace an existing invoice, re-running the allocation
    Amend {
        event: EventId,
        header: InvoiceHeader,
    },
    /// Itemized line for the event's open invoice
    Item {
        event: EventId,
        invoice: InvoiceId,
        item: ItemDraft,
    },
    /// Remove an invoice
    Void { event: EventId, invoice: InvoiceId },
    /// Remove a participant
    Leave {
        event: EventId,
        participant: ParticipantId,
    },
    /// Change a participant's display name
    Rename {
        event: EventId,
        participant: ParticipantId,
        name: String,
    },
    /// Mark the payment between two participants as settled or open
    Settle {
        event: EventId,
        from: ParticipantId,
        to: ParticipantId,
        is_settled: bool,
    },
}

impl LedgerRecord {
    /// The event this record belongs to
    pub fn event_id(&self) -> &str {
        match self {
            LedgerRecord::Event(event) => &event.id,
            LedgerRecord::Participant { event, .. }
            | LedgerRecord::Invoice { event, .. }
            | LedgerRecord::Amend { event, .. }
            | LedgerRecord::Item { event, .. }
            | LedgerRecord::Void { event, .. }
            | LedgerRecord::Leave { event, .. }
            | LedgerRecord::Rename { event, .. }
            | LedgerRecord::Settle { event, .. } => event,
        }
    }
}
