//! Monetary rounding primitives
//!
//! Every split in the engine (equal split, consumption remainder, item split,
//! tip split, birthday gift redistribution) goes through
//! [`divide_with_remainder`], so the parts always add back up to the whole.

use rust_decimal::{Decimal, RoundingStrategy};

/// Reconciliation tolerance for consumption and item sums (one cent)
pub const TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Smallest magnitude treated as a non-zero balance
pub const CENT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Minimizer filter threshold for creditors and debtors
pub const SETTLE_THRESHOLD: Decimal = Decimal::from_parts(9, 0, 0, false, 3);

/// Round to cents, halves away from zero
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Split `amount` into `count` parts
///
/// The first `count - 1` parts are `round2(amount / count)`; the last part is
/// whatever remains, so the parts always sum to `round2(amount)`. Returns an
/// empty vector when `count` is zero.
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_settlement_engine::core::money::divide_with_remainder;
///
/// let parts = divide_with_remainder(Decimal::new(100, 0), 3);
/// assert_eq!(parts, vec![Decimal::new(3333, 2), Decimal::new(3333, 2), Decimal::new(3334, 2)]);
/// ```
pub fn divide_with_remainder(amount: Decimal, count: usize) -> Vec<Decimal> {
    if count == 0 {
        return Vec::new();
    }

    let per_part = round2(amount / Decimal::from(count));
    let mut parts = Vec::with_capacity(count);
    let mut allocated = Decimal::ZERO;
    for _ in 0..count - 1 {
        parts.push(per_part);
        allocated += per_part;
    }
    parts.push(round2(amount - allocated));

    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Decimal::new(3333333, 5), Decimal::new(3333, 2))]
    #[case(Decimal::new(1005, 3), Decimal::new(101, 2))] // half away from zero
    #[case(Decimal::new(-1005, 3), Decimal::new(-101, 2))]
    #[case(Decimal::new(20, 0), Decimal::new(2000, 2))]
    fn test_round2(#[case] input: Decimal, #[case] expected: Decimal) {
        assert_eq!(round2(input), expected);
    }

    #[rstest]
    #[case::thirds(Decimal::new(100, 0), 3, vec![Decimal::new(3333, 2), Decimal::new(3333, 2), Decimal::new(3334, 2)])]
    #[case::exact(Decimal::new(9, 0), 3, vec![Decimal::new(3, 0), Decimal::new(3, 0), Decimal::new(3, 0)])]
    #[case::single(Decimal::new(1999, 2), 1, vec![Decimal::new(1999, 2)])]
    #[case::rounded_up_share(Decimal::new(2, 0), 3, vec![Decimal::new(67, 2), Decimal::new(67, 2), Decimal::new(66, 2)])]
    #[case::one_cent(Decimal::new(1, 2), 2, vec![Decimal::new(1, 2), Decimal::ZERO])]
    fn test_divide_with_remainder(
        #[case] amount: Decimal,
        #[case] count: usize,
        #[case] expected: Vec<Decimal>,
    ) {
        let parts = divide_with_remainder(amount, count);
        assert_eq!(parts, expected);
        assert_eq!(parts.iter().copied().sum::<Decimal>(), amount);
    }

    #[test]
    fn test_divide_with_remainder_zero_count() {
        assert!(divide_with_remainder(Decimal::TEN, 0).is_empty());
    }

    #[test]
    fn test_constants() {
        assert_eq!(TOLERANCE, Decimal::new(1, 2));
        assert_eq!(CENT, Decimal::new(1, 2));
        assert_eq!(SETTLE_THRESHOLD, Decimal::new(9, 3));
    }
}
