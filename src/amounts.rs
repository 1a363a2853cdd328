//! Minor-unit amounts
//!
//! All monetary results are whole minor units (pence/cents). Every conversion from a
//! [`Decimal`] intermediate back to minor units rounds half away from zero, so `0.5`
//! becomes `1` and `-0.5` becomes `-1`.

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

/// Rounding applied wherever a minor-unit amount is produced.
pub const ROUNDING: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

/// Round a decimal amount to whole minor units.
///
/// Returns `None` when the rounded value does not fit in an `i64`.
pub fn round_to_minor(amount: Decimal) -> Option<i64> {
    amount.round_dp_with_strategy(0, ROUNDING).to_i64()
}

/// Calculate `percent` of a minor-unit amount, unrounded.
///
/// Returns `None` if the multiplication overflows the decimal range.
pub fn percent_of(percent: &Percentage, minor: i64) -> Option<Decimal> {
    // decimal_percentage doesn't expose the underlying Decimal
    ((*percent) * Decimal::ONE).checked_mul(Decimal::from(minor))
}
