//! Invoice allocation
//!
//! Turns an [`InvoiceDraft`] into an [`Invoice`] whose participations sum
//! exactly to round2(total + tip).
//!
//! # Pipeline
//!
//! ```text
//! InvoiceDraft
//!     │  validate (every check runs before any share is computed)
//!     ▼
//! base shares ── equal: divide total with remainder to the last participant
//!     │          consumption: declared (or item-derived) values, last absorbs remainder
//!     ▼
//! birthday gift ── birthday person's base moved onto everyone else
//!     ▼
//! tip shares ── tip divided across all participants, birthday person included
//!     ▼
//! merge ── final = round2(base + tip); last participant's tip corrected so
//!          the finals add up to round2(total + tip)
//! ```
//!
//! Every division uses the same remainder-to-last rule from
//! [`money::divide_with_remainder`](crate::core::money::divide_with_remainder).
//! The last participant in list order absorbs all rounding drift.

use crate::core::item_splitter::{item_total, split_items};
use crate::core::money::{divide_with_remainder, round2, TOLERANCE};
use crate::core::traits::ParticipantDirectory;
use crate::types::{
    Consumptions, Division, Invoice, InvoiceDraft, InvoiceItem, ItemDraft, ParticipantId,
    Participation, SettlementError,
};
use rust_decimal::Decimal;

/// Where base shares come from once the draft has been validated
enum BaseSource {
    Equal,
    /// Rounded consumption per participant, in participant order
    Consumption(Vec<Decimal>),
}

/// A draft that passed every check
struct ValidatedDraft {
    description: String,
    /// round2(total + tip), the exact sum the finals must reach
    amount_paid: Decimal,
    participants: Vec<ParticipantId>,
    source: BaseSource,
    items: Vec<InvoiceItem>,
}

/// Allocate one invoice
///
/// The payer is appended to the participant list when absent; duplicate
/// participant ids keep their first position.
///
/// # Errors
///
/// Returns the first violated rule as a field-scoped validation, unknown
/// participants, consistency or arithmetic overflow error. No partial
/// allocation is ever returned.
pub fn allocate<D>(
    event_id: &str,
    draft: &InvoiceDraft,
    directory: &D,
) -> Result<Invoice, SettlementError>
where
    D: ParticipantDirectory + ?Sized,
{
    let validated = validate(draft, directory)?;
    let participants = &validated.participants;

    let mut base = match &validated.source {
        BaseSource::Equal => divide_with_remainder(draft.total_amount, participants.len()),
        BaseSource::Consumption(values) => consumption_shares(draft.total_amount, values),
    };

    if let Some(birthday_person) = &draft.birthday_person_id {
        apply_birthday_gift(participants, &mut base, birthday_person);
    }

    let tips = tip_shares(draft.tip_amount, participants.len());
    let participations = merge_shares(participants, &base, &tips, validated.amount_paid);

    let consumptions: Option<Consumptions> = match validated.source {
        BaseSource::Equal => None,
        BaseSource::Consumption(values) => {
            Some(participants.iter().cloned().zip(values).collect())
        }
    };

    Ok(Invoice {
        id: draft.id.clone(),
        event_id: event_id.to_string(),
        payer_id: draft.payer_id.clone(),
        description: validated.description,
        total_amount: draft.total_amount,
        tip_amount: draft.tip_amount,
        amount_paid: validated.amount_paid,
        division_method: draft.division.method(),
        birthday_person_id: draft.birthday_person_id.clone(),
        consumptions,
        items: validated.items,
        participations,
    })
}

fn validate<D>(draft: &InvoiceDraft, directory: &D) -> Result<ValidatedDraft, SettlementError>
where
    D: ParticipantDirectory + ?Sized,
{
    let description = draft.description.trim();
    if description.is_empty() {
        return Err(SettlementError::validation("description", "Description is required"));
    }
    if draft.total_amount <= Decimal::ZERO {
        return Err(SettlementError::validation(
            "totalAmount",
            "Total amount must be greater than 0",
        ));
    }
    if draft.tip_amount < Decimal::ZERO {
        return Err(SettlementError::validation("tipAmount", "Tip amount must be >= 0"));
    }

    let amount_paid = draft
        .total_amount
        .checked_add(draft.tip_amount)
        .map(round2)
        .ok_or_else(|| SettlementError::overflow("tipAmount", "totalAmount + tipAmount"))?;

    if draft.payer_id.trim().is_empty() {
        return Err(SettlementError::validation("payerId", "Payer is required"));
    }

    let participants = participant_list(&draft.participant_ids, &draft.payer_id);
    if participants.is_empty() {
        return Err(SettlementError::validation(
            "participantIds",
            "At least one participant is required",
        ));
    }

    let unknown = unknown_ids(participants.iter(), directory);
    if !unknown.is_empty() {
        return Err(SettlementError::unknown_participants("participantIds", unknown));
    }

    if let Division::Itemized(items) = &draft.division {
        let unknown = unknown_ids(items.iter().flat_map(|i| i.participant_ids.iter()), directory);
        if !unknown.is_empty() {
            return Err(SettlementError::unknown_participants("items", unknown));
        }
    }

    if let Some(birthday_person) = &draft.birthday_person_id {
        if !directory.contains(birthday_person) {
            return Err(SettlementError::unknown_participants(
                "birthdayPersonId",
                vec![birthday_person.clone()],
            ));
        }
        if !participants.contains(birthday_person) {
            return Err(SettlementError::validation(
                "birthdayPersonId",
                "Birthday person must be a participant",
            ));
        }
    }

    let (source, items) = match &draft.division {
        Division::Equal => (BaseSource::Equal, Vec::new()),
        Division::Consumption(map) => (
            BaseSource::Consumption(validate_consumptions(
                map,
                &participants,
                draft.total_amount,
            )?),
            Vec::new(),
        ),
        Division::Itemized(items) => {
            let items = validate_items(items, &participants, draft.total_amount)?;
            let split = split_items(&draft.id, &items, &participants)?;
            let values = split.consumptions.into_iter().map(|(_, v)| v).collect();
            (BaseSource::Consumption(values), split.items)
        }
    };

    Ok(ValidatedDraft {
        description: description.to_string(),
        amount_paid,
        participants,
        source,
        items,
    })
}

/// Deduplicated participant list with the payer appended when absent
fn participant_list(participant_ids: &[ParticipantId], payer_id: &str) -> Vec<ParticipantId> {
    let mut participants = dedupe(participant_ids);
    if !participants.iter().any(|id| id == payer_id) {
        participants.push(payer_id.to_string());
    }
    participants
}

fn dedupe(ids: &[ParticipantId]) -> Vec<ParticipantId> {
    let mut unique: Vec<ParticipantId> = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(id.clone());
        }
    }
    unique
}

fn unknown_ids<'a, D, I>(ids: I, directory: &D) -> Vec<ParticipantId>
where
    D: ParticipantDirectory + ?Sized,
    I: Iterator<Item = &'a ParticipantId>,
{
    let mut unknown: Vec<ParticipantId> = Vec::new();
    for id in ids {
        if !directory.contains(id) && !unknown.contains(id) {
            unknown.push(id.clone());
        }
    }
    unknown
}

/// Check a declared consumption map and return the rounded value of every
/// participant, in participant order (missing entries count as zero)
fn validate_consumptions(
    map: &Consumptions,
    participants: &[ParticipantId],
    total_amount: Decimal,
) -> Result<Vec<Decimal>, SettlementError> {
    let mut seen: Vec<&str> = Vec::with_capacity(map.len());
    let mut strangers: Vec<ParticipantId> = Vec::new();
    for (id, value) in map {
        if seen.contains(&id.as_str()) {
            return Err(SettlementError::validation(
                "consumptions",
                &format!("Duplicate consumption for {}", id),
            ));
        }
        seen.push(id);
        if *value < Decimal::ZERO {
            return Err(SettlementError::validation("consumptions", "Consumptions must be >= 0"));
        }
        if !participants.contains(id) {
            strangers.push(id.clone());
        }
    }
    if !strangers.is_empty() {
        return Err(SettlementError::unknown_participants("consumptions", strangers));
    }

    let values: Vec<Decimal> = participants
        .iter()
        .map(|id| {
            map.iter()
                .find(|(key, _)| key == id)
                .map(|(_, value)| round2(*value))
                .unwrap_or(Decimal::ZERO)
        })
        .collect();

    let total_consumption = values
        .iter()
        .try_fold(Decimal::ZERO, |sum, value| sum.checked_add(*value))
        .ok_or_else(|| SettlementError::overflow("consumptions", "consumption sum"))?;
    if !values.iter().any(|v| *v > Decimal::ZERO) {
        return Err(SettlementError::validation(
            "consumptions",
            "At least one consumption > 0 is required",
        ));
    }
    if (total_amount - total_consumption).abs() > TOLERANCE {
        return Err(SettlementError::consistency("consumptions", total_consumption, total_amount));
    }

    Ok(values)
}

/// Check every item and the item sum; returns the items with trimmed names
/// and deduplicated participant subsets
fn validate_items(
    items: &[ItemDraft],
    participants: &[ParticipantId],
    total_amount: Decimal,
) -> Result<Vec<ItemDraft>, SettlementError> {
    let mut normalized = Vec::with_capacity(items.len());
    let mut items_total = Decimal::ZERO;

    for (index, item) in items.iter().enumerate() {
        let field = |name: &str| format!("items[{}].{}", index, name);

        let name = item.name.trim();
        if name.is_empty() {
            return Err(SettlementError::validation(&field("name"), "Item name is required"));
        }
        if item.unit_price <= Decimal::ZERO {
            return Err(SettlementError::validation(
                &field("unitPrice"),
                "Unit price must be greater than 0",
            ));
        }
        if item.quantity < 1 {
            return Err(SettlementError::validation(
                &field("quantity"),
                "Quantity must be an integer >= 1",
            ));
        }

        let sharers = dedupe(&item.participant_ids);
        if sharers.is_empty() {
            return Err(SettlementError::validation(
                &field("participantIds"),
                "At least one participant is required per item",
            ));
        }
        let outsiders: Vec<ParticipantId> = sharers
            .iter()
            .filter(|id| !participants.contains(id))
            .cloned()
            .collect();
        if !outsiders.is_empty() {
            return Err(SettlementError::unknown_participants(&field("participantIds"), outsiders));
        }

        let item = ItemDraft {
            name: name.to_string(),
            unit_price: item.unit_price,
            quantity: item.quantity,
            participant_ids: sharers,
        };
        items_total = item_total(&item)
            .and_then(|total| items_total.checked_add(total))
            .ok_or_else(|| SettlementError::overflow(&field("total"), "unitPrice * quantity"))?;
        normalized.push(item);
    }

    if (total_amount - items_total).abs() > TOLERANCE {
        return Err(SettlementError::consistency("items", items_total, total_amount));
    }

    Ok(normalized)
}

/// Consumption-weighted base shares: declared values for everyone but the
/// last participant, who receives `total - Σ(others)`
fn consumption_shares(total_amount: Decimal, values: &[Decimal]) -> Vec<Decimal> {
    let Some((_, others)) = values.split_last() else {
        return Vec::new();
    };

    let allocated: Decimal = others.iter().copied().sum();
    let mut shares = others.to_vec();
    shares.push(round2(total_amount - allocated));
    shares
}

/// Zero the birthday person's base share and spread it over everyone else
fn apply_birthday_gift(participants: &[ParticipantId], base: &mut [Decimal], birthday_person: &str) {
    let Some(position) = participants.iter().position(|id| id == birthday_person) else {
        return;
    };

    let gift = base[position];
    base[position] = Decimal::ZERO;

    let others: Vec<usize> = (0..participants.len()).filter(|i| *i != position).collect();
    if others.is_empty() || gift.is_zero() {
        return;
    }

    let portions = divide_with_remainder(gift, others.len());
    for (index, portion) in others.into_iter().zip(portions) {
        base[index] = round2(base[index] + portion);
    }
}

/// Tip divided across all participants; all zero when there is no tip
fn tip_shares(tip_amount: Decimal, count: usize) -> Vec<Decimal> {
    if tip_amount <= Decimal::ZERO {
        return vec![Decimal::ZERO; count];
    }
    divide_with_remainder(tip_amount, count)
}

/// Combine base and tip shares into participations, correcting the last
/// participant's tip so the finals sum to `expected_total`
///
/// Base and tip shares are whole cents and `expected_total` is already
/// rounded, so the correction is exact.
fn merge_shares(
    participants: &[ParticipantId],
    base: &[Decimal],
    tips: &[Decimal],
    expected_total: Decimal,
) -> Vec<Participation> {
    let last = participants.len().saturating_sub(1);
    let mut allocated = Decimal::ZERO;

    participants
        .iter()
        .zip(base.iter().zip(tips))
        .enumerate()
        .map(|(index, (participant_id, (base_amount, tip)))| {
            let mut tip_share = *tip;
            let mut final_amount = round2(*base_amount + tip_share);
            allocated += final_amount;

            if index == last {
                let drift = expected_total - allocated;
                tip_share += drift;
                final_amount = round2(*base_amount + tip_share);
            }

            Participation {
                participant_id: participant_id.clone(),
                base_amount: *base_amount,
                tip_share,
                final_amount,
            }
        })
        .collect()
}
