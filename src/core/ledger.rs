//! Per-event ledger
//!
//! This module provides the EventLedger that keeps one event's roster and
//! invoices and derives settlements from them.
//!
//! The ledger enforces the event-level rules around the pure calculators:
//! - Participant ids are unique within the event
//! - Invoice ids are unique within the event
//! - A participant referenced by an invoice cannot leave
//! - Every stored invoice keeps the event's balances inside the `Decimal` range
//! - Balances and transfers are always recomputed from the invoices
//! - Transfer statuses are upserted per (from, to) pair

use crate::core::allocation::allocate;
use crate::core::balance_aggregator::aggregate_balances;
use crate::core::traits::ParticipantDirectory;
use crate::core::transfer_minimizer::minimize_transfers;
use crate::types::{
    Balance, Event, EventSummary, Invoice, InvoiceDraft, Participant, SettlementError, Transfer,
    TransferStatus,
};
use tracing::debug;

/// Roster and invoices of a single event
#[derive(Debug, Clone)]
pub struct EventLedger {
    event: Event,
    participants: Vec<Participant>,
    invoices: Vec<Invoice>,
    transfer_statuses: Vec<TransferStatus>,
}

impl EventLedger {
    /// Create an empty ledger for the event
    pub fn new(event: Event) -> Self {
        EventLedger {
            event,
            participants: Vec::new(),
            invoices: Vec::new(),
            transfer_statuses: Vec::new(),
        }
    }

    /// The event this ledger belongs to
    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Participants in registration order
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Invoices in creation order
    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    /// Recorded transfer statuses, in first-recorded order
    pub fn transfer_statuses(&self) -> &[TransferStatus] {
        &self.transfer_statuses
    }

    /// Look up an invoice by id
    pub fn invoice(&self, invoice_id: &str) -> Option<&Invoice> {
        self.invoices.iter().find(|i| i.id == invoice_id)
    }

    /// Register a participant
    ///
    /// # Errors
    ///
    /// Returns `DuplicateParticipant` if the id is already registered.
    pub fn add_participant(&mut self, participant: Participant) -> Result<(), SettlementError> {
        if self.contains(&participant.id) {
            return Err(SettlementError::DuplicateParticipant {
                event: self.event.id.clone(),
                participant: participant.id,
            });
        }

        debug!(event = %self.event.id, participant = %participant.id, "participant added");
        self.participants.push(participant);
        Ok(())
    }

    /// Change a participant's display name
    ///
    /// # Errors
    ///
    /// Returns `ParticipantNotFound` for an unknown id, or a `name`
    /// validation error when the trimmed name is empty.
    pub fn rename_participant(
        &mut self,
        participant_id: &str,
        name: &str,
    ) -> Result<&Participant, SettlementError> {
        let event_id = &self.event.id;
        let participant = self
            .participants
            .iter_mut()
            .find(|p| p.id == participant_id)
            .ok_or_else(|| SettlementError::participant_not_found(event_id, participant_id))?;

        *participant = Participant::new(participant_id, name)?;
        debug!(event = %self.event.id, participant = participant_id, "participant renamed");
        Ok(&*participant)
    }

    /// Remove a participant that no invoice references
    ///
    /// Transfer statuses naming the participant are dropped with them.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The participant is not registered
    /// - An invoice names the participant as payer or participant
    pub fn remove_participant(&mut self, participant_id: &str) -> Result<Participant, SettlementError> {
        let position = self
            .participants
            .iter()
            .position(|p| p.id == participant_id)
            .ok_or_else(|| SettlementError::participant_not_found(&self.event.id, participant_id))?;

        if self.invoices.iter().any(|i| i.references(participant_id)) {
            return Err(SettlementError::ParticipantHasInvoices {
                event: self.event.id.clone(),
                participant: participant_id.to_string(),
            });
        }

        debug!(event = %self.event.id, participant = participant_id, "participant removed");
        self.transfer_statuses.retain(|status| {
            status.from_participant_id != participant_id
                && status.to_participant_id != participant_id
        });
        Ok(self.participants.remove(position))
    }

    /// Allocate and store a new invoice
    ///
    /// # Errors
    ///
    /// Returns `DuplicateInvoice` if the id is taken, any allocation error, or
    /// `ArithmeticOverflow` when the invoice would push a balance out of range.
    /// The ledger is unchanged on error.
    pub fn record_invoice(&mut self, draft: &InvoiceDraft) -> Result<&Invoice, SettlementError> {
        if self.invoice(&draft.id).is_some() {
            return Err(SettlementError::DuplicateInvoice {
                event: self.event.id.clone(),
                invoice: draft.id.clone(),
            });
        }

        let invoice = allocate(&self.event.id, draft, &*self)?;
        debug!(
            event = %self.event.id,
            invoice = %invoice.id,
            participants = invoice.participations.len(),
            "invoice allocated"
        );

        self.invoices.push(invoice);
        if let Err(e) = aggregate_balances(&self.participants, &self.invoices) {
            self.invoices.pop();
            return Err(e);
        }
        let last = self.invoices.len() - 1;
        Ok(&self.invoices[last])
    }

    /// Replace an existing invoice, re-running the allocation from scratch
    ///
    /// The invoice keeps its position in creation order.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceNotFound` if no invoice has the draft's id, any
    /// allocation error, or `ArithmeticOverflow` when the new version would
    /// push a balance out of range. The previous invoice is kept on error.
    pub fn update_invoice(&mut self, draft: &InvoiceDraft) -> Result<&Invoice, SettlementError> {
        let position = self
            .invoices
            .iter()
            .position(|i| i.id == draft.id)
            .ok_or_else(|| SettlementError::invoice_not_found(&self.event.id, &draft.id))?;

        let invoice = allocate(&self.event.id, draft, &*self)?;
        debug!(event = %self.event.id, invoice = %invoice.id, "invoice reallocated");

        let previous = std::mem::replace(&mut self.invoices[position], invoice);
        if let Err(e) = aggregate_balances(&self.participants, &self.invoices) {
            self.invoices[position] = previous;
            return Err(e);
        }
        Ok(&self.invoices[position])
    }

    /// Delete an invoice
    ///
    /// # Errors
    ///
    /// Returns `InvoiceNotFound` if the id is unknown.
    pub fn remove_invoice(&mut self, invoice_id: &str) -> Result<Invoice, SettlementError> {
        let position = self
            .invoices
            .iter()
            .position(|i| i.id == invoice_id)
            .ok_or_else(|| SettlementError::invoice_not_found(&self.event.id, invoice_id))?;

        debug!(event = %self.event.id, invoice = invoice_id, "invoice removed");
        Ok(self.invoices.remove(position))
    }

    /// Mark the payment from one participant to another as settled or not
    ///
    /// The status for a (from, to) pair is created on first use and
    /// overwritten afterwards. The pair does not have to match a current
    /// suggested transfer.
    ///
    /// # Errors
    ///
    /// Returns `ParticipantNotFound` when either side is not registered, or a
    /// `toParticipantId` validation error when both sides are the same.
    pub fn set_transfer_status(
        &mut self,
        from_participant_id: &str,
        to_participant_id: &str,
        is_settled: bool,
    ) -> Result<&TransferStatus, SettlementError> {
        for id in [from_participant_id, to_participant_id] {
            if !self.contains(id) {
                return Err(SettlementError::participant_not_found(&self.event.id, id));
            }
        }
        if from_participant_id == to_participant_id {
            return Err(SettlementError::validation(
                "toParticipantId",
                "A transfer needs two different participants",
            ));
        }

        debug!(
            event = %self.event.id,
            from = from_participant_id,
            to = to_participant_id,
            is_settled,
            "transfer status recorded"
        );
        let position = match self.transfer_statuses.iter().position(|status| {
            status.from_participant_id == from_participant_id
                && status.to_participant_id == to_participant_id
        }) {
            Some(position) => {
                self.transfer_statuses[position].is_settled = is_settled;
                position
            }
            None => {
                self.transfer_statuses.push(TransferStatus {
                    from_participant_id: from_participant_id.to_string(),
                    to_participant_id: to_participant_id.to_string(),
                    is_settled,
                });
                self.transfer_statuses.len() - 1
            }
        };
        Ok(&self.transfer_statuses[position])
    }

    /// Current balance of every participant
    ///
    /// # Errors
    ///
    /// Returns `ArithmeticOverflow` if a balance leaves the `Decimal` range;
    /// invoices recorded through this ledger never do.
    pub fn balances(&self) -> Result<Vec<Balance>, SettlementError> {
        aggregate_balances(&self.participants, &self.invoices)
    }

    /// Transfers that settle the current balances
    pub fn transfers(&self) -> Result<Vec<Transfer>, SettlementError> {
        Ok(minimize_transfers(&self.balances()?))
    }

    /// Full overview of the event
    pub fn summary(&self) -> Result<EventSummary, SettlementError> {
        let balances = self.balances()?;
        let transfers = minimize_transfers(&balances);

        Ok(EventSummary {
            event: self.event.clone(),
            participants: self.participants.clone(),
            invoices: self.invoices.clone(),
            balances,
            transfers,
            transfer_statuses: self.transfer_statuses.clone(),
        })
    }
}

impl ParticipantDirectory for EventLedger {
    fn contains(&self, participant_id: &str) -> bool {
        self.participants.iter().any(|p| p.id == participant_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BalanceStatus, Currency, Division};
    use rstest::rstest;
    use rust_decimal::Decimal;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn ledger() -> EventLedger {
        let mut ledger = EventLedger::new(Event::new("trip", "Beach trip", Currency::Usd).unwrap());
        for (id, name) in [("ana", "Ana"), ("ben", "Ben"), ("cy", "Cy")] {
            ledger.add_participant(Participant::new(id, name).unwrap()).unwrap();
        }
        ledger
    }

    fn draft(id: &str, payer: &str, total: &str) -> InvoiceDraft {
        InvoiceDraft {
            id: id.to_string(),
            payer_id: payer.to_string(),
            description: "Groceries".to_string(),
            total_amount: dec(total),
            tip_amount: Decimal::ZERO,
            participant_ids: vec!["ana".to_string(), "ben".to_string(), "cy".to_string()],
            division: Division::Equal,
            birthday_person_id: None,
        }
    }

    #[test]
    fn test_duplicate_participant_is_rejected() {
        let mut ledger = ledger();
        let err = ledger
            .add_participant(Participant::new("ana", "Another Ana").unwrap())
            .unwrap_err();

        assert!(matches!(err, SettlementError::DuplicateParticipant { .. }));
        assert_eq!(ledger.participants().len(), 3);
    }

    #[test]
    fn test_record_invoice_and_settle() {
        let mut ledger = ledger();
        ledger.record_invoice(&draft("inv-1", "ana", "90")).unwrap();

        let balances = ledger.balances().unwrap();
        assert_eq!(balances[0].net_balance, dec("60"));
        assert_eq!(balances[1].status, BalanceStatus::Debtor);

        let transfers = ledger.transfers().unwrap();
        assert_eq!(transfers.len(), 2);
        assert!(transfers.iter().all(|t| t.to_participant_id == "ana"));
    }

    #[test]
    fn test_duplicate_invoice_is_rejected() {
        let mut ledger = ledger();
        ledger.record_invoice(&draft("inv-1", "ana", "90")).unwrap();
        let err = ledger.record_invoice(&draft("inv-1", "ben", "10")).unwrap_err();

        assert!(matches!(err, SettlementError::DuplicateInvoice { .. }));
        assert_eq!(ledger.invoices().len(), 1);
    }

    #[test]
    fn test_rejected_invoice_leaves_ledger_unchanged() {
        let mut ledger = ledger();
        let mut bad = draft("inv-1", "ana", "90");
        bad.participant_ids.push("zoe".to_string());

        let err = ledger.record_invoice(&bad).unwrap_err();
        assert_eq!(err.field(), Some("participantIds"));
        assert!(ledger.invoices().is_empty());
    }

    #[test]
    fn test_update_invoice_reallocates_in_place() {
        let mut ledger = ledger();
        ledger.record_invoice(&draft("inv-1", "ana", "90")).unwrap();
        ledger.record_invoice(&draft("inv-2", "ben", "30")).unwrap();

        let updated = ledger.update_invoice(&draft("inv-1", "cy", "60")).unwrap();
        assert_eq!(updated.payer_id, "cy");
        assert_eq!(updated.participations[0].final_amount, dec("20"));
        assert_eq!(ledger.invoices()[0].id, "inv-1");

        let err = ledger.update_invoice(&draft("inv-9", "cy", "60")).unwrap_err();
        assert_eq!(err, SettlementError::invoice_not_found("trip", "inv-9"));
    }

    #[test]
    fn test_failed_update_keeps_previous_invoice() {
        let mut ledger = ledger();
        ledger.record_invoice(&draft("inv-1", "ana", "90")).unwrap();

        let mut bad = draft("inv-1", "ana", "90");
        bad.description = String::new();
        assert!(ledger.update_invoice(&bad).is_err());
        assert_eq!(ledger.invoice("inv-1").unwrap().total_amount, dec("90"));
    }

    #[test]
    fn test_participant_with_invoices_cannot_leave() {
        let mut ledger = ledger();
        ledger.record_invoice(&draft("inv-1", "ana", "90")).unwrap();

        let err = ledger.remove_participant("ben").unwrap_err();
        assert!(matches!(err, SettlementError::ParticipantHasInvoices { .. }));

        ledger.remove_invoice("inv-1").unwrap();
        let removed = ledger.remove_participant("ben").unwrap();
        assert_eq!(removed.name, "Ben");
        assert!(!ledger.contains("ben"));
    }

    #[test]
    fn test_remove_unknown_entities() {
        let mut ledger = ledger();
        assert_eq!(
            ledger.remove_participant("zoe").unwrap_err(),
            SettlementError::participant_not_found("trip", "zoe")
        );
        assert_eq!(
            ledger.remove_invoice("inv-1").unwrap_err(),
            SettlementError::invoice_not_found("trip", "inv-1")
        );
    }

    #[test]
    fn test_summary_is_recomputed_from_invoices() {
        let mut ledger = ledger();
        ledger.record_invoice(&draft("inv-1", "ana", "90")).unwrap();
        ledger.remove_invoice("inv-1").unwrap();

        let summary = ledger.summary().unwrap();
        assert!(summary.invoices.is_empty());
        assert!(summary.transfers.is_empty());
        assert!(summary
            .balances
            .iter()
            .all(|b| b.status == BalanceStatus::Settled));
    }

    #[test]
    fn test_overflowing_invoice_is_rolled_back() {
        let huge = "50000000000000000000000000000";
        let mut ledger = ledger();
        ledger.record_invoice(&draft("inv-1", "ana", huge)).unwrap();

        let err = ledger.record_invoice(&draft("inv-2", "ana", huge)).unwrap_err();
        assert!(matches!(err, SettlementError::ArithmeticOverflow { .. }));
        assert_eq!(ledger.invoices().len(), 1);

        ledger.record_invoice(&draft("inv-2", "ben", "30")).unwrap();
        let err = ledger.update_invoice(&draft("inv-2", "ana", huge)).unwrap_err();
        assert_eq!(err.field(), Some("totalPaid"));
        assert_eq!(ledger.invoice("inv-2").unwrap().payer_id, "ben");
        assert!(ledger.summary().is_ok());
    }

    #[test]
    fn test_sub_cent_invoice_keeps_balances_conserved() {
        let mut ledger = ledger();
        ledger.record_invoice(&draft("inv-1", "ana", "10.005")).unwrap();

        let balances = ledger.balances().unwrap();
        assert_eq!(balances[0].total_paid, dec("10.01"));
        let net: Decimal = balances.iter().map(|b| b.net_balance).sum();
        assert_eq!(net, Decimal::ZERO);
    }

    #[test]
    fn test_rename_participant_trims_name() {
        let mut ledger = ledger();
        let renamed = ledger.rename_participant("ana", " Ana Maria ").unwrap();

        assert_eq!(renamed.id, "ana");
        assert_eq!(renamed.name, "Ana Maria");
        assert_eq!(ledger.participants()[0].name, "Ana Maria");
    }

    #[test]
    fn test_blank_rename_keeps_previous_name() {
        let mut ledger = ledger();
        let err = ledger.rename_participant("ana", "   ").unwrap_err();

        assert_eq!(err, SettlementError::validation("name", "Name is required"));
        assert_eq!(ledger.participants()[0].name, "Ana");
    }

    #[test]
    fn test_rename_unknown_participant() {
        let mut ledger = ledger();
        assert_eq!(
            ledger.rename_participant("zoe", "Zoe").unwrap_err(),
            SettlementError::participant_not_found("trip", "zoe")
        );
    }

    #[test]
    fn test_transfer_status_is_upserted() {
        let mut ledger = ledger();
        ledger.record_invoice(&draft("inv-1", "ana", "90")).unwrap();

        ledger.set_transfer_status("ben", "ana", true).unwrap();
        ledger.set_transfer_status("cy", "ana", true).unwrap();
        let status = ledger.set_transfer_status("ben", "ana", false).unwrap();
        assert!(!status.is_settled);

        let statuses = ledger.transfer_statuses();
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].from_participant_id, "ben");
        assert!(!statuses[0].is_settled);
        assert!(statuses[1].is_settled);

        let summary = ledger.summary().unwrap();
        let settled: Vec<(&str, bool)> = summary
            .transfers
            .iter()
            .map(|t| (t.from_participant_id.as_str(), summary.is_settled(t)))
            .collect();
        assert_eq!(settled, vec![("ben", false), ("cy", true)]);
    }

    #[rstest]
    #[case::unknown_debtor("zoe", "ana", SettlementError::participant_not_found("trip", "zoe"))]
    #[case::unknown_creditor("ben", "max", SettlementError::participant_not_found("trip", "max"))]
    #[case::same_participant(
        "ana",
        "ana",
        SettlementError::validation(
            "toParticipantId",
            "A transfer needs two different participants"
        )
    )]
    fn test_invalid_transfer_status(
        #[case] from: &str,
        #[case] to: &str,
        #[case] expected: SettlementError,
    ) {
        let mut ledger = ledger();
        assert_eq!(ledger.set_transfer_status(from, to, true).unwrap_err(), expected);
        assert!(ledger.transfer_statuses().is_empty());
    }

    #[test]
    fn test_leaving_participant_drops_statuses() {
        let mut ledger = ledger();
        ledger.set_transfer_status("ben", "ana", true).unwrap();
        ledger.set_transfer_status("cy", "ana", true).unwrap();

        ledger.remove_participant("ben").unwrap();
        assert_eq!(ledger.transfer_statuses().len(), 1);
        assert_eq!(ledger.transfer_statuses()[0].from_participant_id, "cy");
    }
}
