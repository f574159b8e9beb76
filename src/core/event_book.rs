//! Record application for one event
//!
//! An `invoice` or `amend` row is followed by zero or more `item` rows, so an
//! invoice cannot be allocated when its header arrives. The EventBook keeps
//! the open header and its items and commits them to the [`EventLedger`] as
//! soon as a non-item record of the same event arrives, or when the input
//! ends.

use crate::core::ledger::EventLedger;
use crate::types::{
    Event, EventSummary, InvoiceHeader, ItemDraft, LedgerRecord, SettlementError,
};
use tracing::warn;

#[derive(Debug, Clone)]
struct PendingInvoice {
    header: InvoiceHeader,
    amend: bool,
    items: Vec<ItemDraft>,
}

/// An event ledger plus the invoice still collecting items
#[derive(Debug, Clone)]
pub struct EventBook {
    ledger: EventLedger,
    pending: Option<PendingInvoice>,
}

impl EventBook {
    /// Create a book for a freshly declared event
    pub fn new(event: Event) -> Self {
        EventBook {
            ledger: EventLedger::new(event),
            pending: None,
        }
    }

    /// The committed state of the event
    pub fn ledger(&self) -> &EventLedger {
        &self.ledger
    }

    /// Apply one record of this event
    ///
    /// Any open invoice is committed before a non-item record is applied. A
    /// rejected open invoice is logged and does not prevent the record from
    /// being applied.
    ///
    /// # Errors
    ///
    /// Returns the error of the record itself:
    /// - `DuplicateEvent` for a second declaration of the event
    /// - `InvoiceNotFound` for an item row with no matching open invoice
    /// - Any ledger error from the participant or invoice operation
    pub fn apply(&mut self, record: LedgerRecord) -> Result<(), SettlementError> {
        if let LedgerRecord::Item { event, invoice, item } = record {
            return match &mut self.pending {
                Some(pending) if pending.header.id == invoice => {
                    pending.items.push(item);
                    Ok(())
                }
                _ => Err(SettlementError::invoice_not_found(&event, &invoice)),
            };
        }

        if let Err(error) = self.commit_pending() {
            warn!(event = %self.ledger.event().id, %error, "invoice rejected");
        }

        match record {
            LedgerRecord::Event(event) => Err(SettlementError::DuplicateEvent { event: event.id }),
            LedgerRecord::Participant { participant, .. } => {
                self.ledger.add_participant(participant)
            }
            LedgerRecord::Invoice { header, .. } => {
                self.pending = Some(PendingInvoice {
                    header,
                    amend: false,
                    items: Vec::new(),
                });
                Ok(())
            }
            LedgerRecord::Amend { header, .. } => {
                self.pending = Some(PendingInvoice {
                    header,
                    amend: true,
                    items: Vec::new(),
                });
                Ok(())
            }
            LedgerRecord::Void { invoice, .. } => self.ledger.remove_invoice(&invoice).map(|_| ()),
            LedgerRecord::Leave { participant, .. } => {
                self.ledger.remove_participant(&participant).map(|_| ())
            }
            LedgerRecord::Rename { participant, name, .. } => {
                self.ledger.rename_participant(&participant, &name).map(|_| ())
            }
            LedgerRecord::Settle {
                from,
                to,
                is_settled,
                ..
            } => self
                .ledger
                .set_transfer_status(&from, &to, is_settled)
                .map(|_| ()),
            LedgerRecord::Item { .. } => Ok(()),
        }
    }

    /// Commit the open invoice, if any
    ///
    /// # Errors
    ///
    /// Returns the division or allocation error of the open invoice. The
    /// invoice is discarded either way.
    pub fn commit_pending(&mut self) -> Result<(), SettlementError> {
        let Some(PendingInvoice {
            header,
            amend,
            items,
        }) = self.pending.take()
        else {
            return Ok(());
        };

        let draft = header.into_draft(items)?;
        if amend {
            self.ledger.update_invoice(&draft)?;
        } else {
            self.ledger.record_invoice(&draft)?;
        }
        Ok(())
    }

    /// Close the book and settle the event
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if the balances cannot be computed.
    pub fn settle(mut self) -> Result<EventSummary, SettlementError> {
        if let Err(error) = self.commit_pending() {
            warn!(event = %self.ledger.event().id, %error, "invoice rejected");
        }
        self.ledger.summary()
    }
}
