//! Item splitting
//!
//! Distributes each itemized line's cost across the participants assigned to
//! it and folds the per-item shares into a consumption map, which then drives
//! the consumption-weighted base split.

use crate::core::money::{divide_with_remainder, round2};
use crate::types::{
    Consumptions, InvoiceItem, ItemAssignment, ItemDraft, ParticipantId, SettlementError,
};
use rust_decimal::Decimal;

/// Output of splitting an invoice's items
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSplit {
    /// Allocated items, in input order
    pub items: Vec<InvoiceItem>,
    /// Per-participant sum of item shares, in invoice participant order
    pub consumptions: Consumptions,
}

/// Line total of an item: round2(unit price × quantity)
///
/// Returns `None` when the product does not fit in a `Decimal`.
pub fn item_total(item: &ItemDraft) -> Option<Decimal> {
    item.unit_price
        .checked_mul(Decimal::from(item.quantity))
        .map(round2)
}

/// Split every item across its participants
///
/// Items are expected to be validated already: positive price and quantity,
/// a non-empty participant subset drawn from `participant_ids`. Participants
/// with no assigned item get a zero consumption. Item ids are derived from the
/// invoice id and the item position so identical input yields identical ids.
/// Overflow is reported against the offending `items[i].total`.
pub fn split_items(
    invoice_id: &str,
    items: &[ItemDraft],
    participant_ids: &[ParticipantId],
) -> Result<ItemSplit, SettlementError> {
    let mut consumptions: Consumptions = participant_ids
        .iter()
        .map(|id| (id.clone(), Decimal::ZERO))
        .collect();

    let items = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let field = format!("items[{}].total", index);
            let total = item_total(item)
                .ok_or_else(|| SettlementError::overflow(&field, "unitPrice * quantity"))?;
            let shares = divide_with_remainder(total, item.participant_ids.len());

            let assignments: Vec<ItemAssignment> = item
                .participant_ids
                .iter()
                .zip(shares)
                .map(|(participant_id, amount)| ItemAssignment {
                    participant_id: participant_id.clone(),
                    amount,
                })
                .collect();

            for assignment in &assignments {
                if let Some((_, consumed)) = consumptions
                    .iter_mut()
                    .find(|(id, _)| *id == assignment.participant_id)
                {
                    *consumed = consumed
                        .checked_add(assignment.amount)
                        .ok_or_else(|| SettlementError::overflow(&field, "consumption sum"))?;
                }
            }

            Ok(InvoiceItem {
                id: format!("{}-item-{}", invoice_id, index + 1),
                name: item.name.trim().to_string(),
                unit_price: item.unit_price,
                quantity: item.quantity,
                total,
                assignments,
            })
        })
        .collect::<Result<Vec<_>, SettlementError>>()?;

    Ok(ItemSplit {
        items,
        consumptions,
    })
}
