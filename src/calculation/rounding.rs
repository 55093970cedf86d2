//! Membership fraction rounding.
//!
//! Membership fractions are reported to three decimal places, rounding
//! midpoints away from zero.

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept on every membership fraction.
pub const MEMBERSHIP_DECIMAL_PLACES: u32 = 3;

/// Rounds a membership value to three places, midpoints away from zero.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::round_membership;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let value = Decimal::from_str("0.0625").unwrap();
/// assert_eq!(round_membership(value), Decimal::from_str("0.063").unwrap());
/// ```
pub fn round_membership(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(
        MEMBERSHIP_DECIMAL_PLACES,
        RoundingStrategy::MidpointAwayFromZero,
    )
}

/// Returns `days / days_in_session`, rounded, or zero for an empty session.
pub fn membership_fraction(days: u32, days_in_session: u32) -> Decimal {
    if days_in_session == 0 {
        return Decimal::ZERO;
    }
    round_membership(Decimal::from(days) / Decimal::from(days_in_session))
}
