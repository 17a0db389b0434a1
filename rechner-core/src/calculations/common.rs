//! Common utility functions for the calculators.
//!
//! This module provides the rounding and guarded arithmetic shared by every
//! component, so that money is always rounded the same way and no division
//! can produce a non-finite value.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use rechner_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    let rounded =
        value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
    // -0.00 compares equal to zero but prints with a sign.
    if rounded.is_zero() {
        Decimal::ZERO.round_dp(2)
    } else {
        rounded
    }
}

/// Rounds a rate to four decimal places.
pub fn round_rate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(4, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Returns the maximum of two decimal values.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use rechner_core::calculations::common::max;
///
/// assert_eq!(max(dec!(100.00), dec!(200.00)), dec!(200.00));
/// assert_eq!(max(dec!(-100.00), dec!(-200.00)), dec!(-100.00));
/// ```
pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// Divides `numerator` by `denominator`, returning zero when the
/// denominator is zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use rechner_core::calculations::common::ratio;
///
/// assert_eq!(ratio(dec!(1), dec!(4)), dec!(0.25));
/// assert_eq!(ratio(dec!(1), dec!(0)), dec!(0));
/// ```
pub fn ratio(
    numerator: Decimal,
    denominator: Decimal,
) -> Decimal {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// Clamps `value` into `[low, high]`. `low` wins if the bounds cross.
pub fn clamp(
    value: Decimal,
    low: Decimal,
    high: Decimal,
) -> Decimal {
    max(value.min(high), low)
}
