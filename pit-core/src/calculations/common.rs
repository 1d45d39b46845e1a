//! Common utility functions for tax calculations.
//!
//! Every amount the engine produces is a whole number of currency units, so
//! rounding here always goes to zero decimal places.

use rust_decimal::{Decimal, RoundingStrategy};

/// One hundred, the denominator for every percentage rate in this crate.
pub const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Rounds a decimal value to a whole currency unit using half-up rounding.
///
/// Values at exactly .5 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use pit_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(197122.4)), dec!(197122));
/// assert_eq!(round_half_up(dec!(197122.5)), dec!(197123));
/// assert_eq!(round_half_up(dec!(-2.5)), dec!(-3)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Applies a percentage rate to an amount and rounds the product.
///
/// Returns `None` if the result does not fit in a [`Decimal`]. Dividing
/// first means any rate up to 100 works for every representable amount.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use rust_decimal_macros::dec;
/// use pit_core::calculations::common::percent_of;
///
/// assert_eq!(percent_of(dec!(5310000), dec!(10.5)), Some(dec!(557550)));
/// assert_eq!(percent_of(Decimal::MAX, dec!(1000)), None);
/// ```
pub fn percent_of(
    amount: Decimal,
    rate: Decimal,
) -> Option<Decimal> {
    amount
        .checked_div(HUNDRED)?
        .checked_mul(rate)
        .map(round_half_up)
}

/// Returns the maximum of two decimal values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use pit_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100), dec!(200)), dec!(200));
/// assert_eq!(max(dec!(-100), dec!(0)), dec!(0));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Returns `true` if `rate` is a percentage in the closed range [0, 100].
pub fn is_valid_percentage(rate: Decimal) -> bool {
    rate >= Decimal::ZERO && rate <= HUNDRED
}
