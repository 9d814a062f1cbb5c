//! Minor-currency-unit conversion for provider line items.
//!
//! Unit prices are carried as [`Decimal`] in the standard currency unit
//! (dollars, not cents). The payment provider's API takes integer amounts in
//! the minor unit, so the conversion here is the one place a price is rounded.
//!
//! Rounding policy: half-away-from-zero, so `19.995` becomes `2000` cents.
//! JavaScript's `Math.round` agrees with this for all non-negative amounts,
//! which keeps historical order totals stable.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

/// Errors that can occur converting a price to minor units.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MinorUnitError {
    /// The amount is negative; line items cannot have negative prices.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
    /// The amount does not fit in an i64 after scaling.
    #[error("price out of range: {0}")]
    OutOfRange(Decimal),
}

/// Convert a standard-unit price to the provider's minor-unit integer.
///
/// Contract: `round(price * 100)`, rounding half away from zero.
///
/// # Errors
///
/// Returns `MinorUnitError::Negative` for negative amounts and
/// `MinorUnitError::OutOfRange` if the scaled value overflows.
pub fn to_minor_units(amount: Decimal) -> Result<i64, MinorUnitError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(MinorUnitError::Negative(amount));
    }

    let cents = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or(MinorUnitError::OutOfRange(amount))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    cents.to_i64().ok_or(MinorUnitError::OutOfRange(amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("valid decimal literal")
    }

    #[test]
    fn whole_dollars() {
        assert_eq!(to_minor_units(dec("10.00")), Ok(1000));
        assert_eq!(to_minor_units(dec("0")), Ok(0));
    }

    #[test]
    fn exact_cents() {
        assert_eq!(to_minor_units(dec("19.99")), Ok(1999));
        assert_eq!(to_minor_units(dec("0.01")), Ok(1));
    }

    #[test]
    fn half_cent_rounds_up() {
        // The documented policy: round(1999.5) == 2000, not 1999.
        assert_eq!(to_minor_units(dec("19.995")), Ok(2000));
        assert_eq!(to_minor_units(dec("0.005")), Ok(1));
    }

    #[test]
    fn below_half_cent_rounds_down() {
        assert_eq!(to_minor_units(dec("19.994")), Ok(1999));
    }

    #[test]
    fn negative_rejected() {
        assert_eq!(
            to_minor_units(dec("-1.00")),
            Err(MinorUnitError::Negative(dec("-1.00")))
        );
    }

    #[test]
    fn out_of_range_rejected() {
        let huge = Decimal::MAX;
        assert!(matches!(
            to_minor_units(huge),
            Err(MinorUnitError::OutOfRange(_))
        ));
    }
}
