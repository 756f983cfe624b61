// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Monetary amounts in minor currency units.
//!
//! All settlement arithmetic is integer arithmetic over minor units.
//! Rounding happens exactly once per line item, inside [`Money::prorate`],
//! using round-half-away-from-zero. Totals are exact integer sums of
//! already-rounded items, so itemized amounts always add up to their total.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};

/// A monetary amount in minor currency units (e.g. centimes).
///
/// Amounts may be negative: a notice payment owed by the employee to the
/// employer is represented as a negative line item.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from minor units.
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the amount in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Returns true if the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns the negated amount.
    #[must_use]
    pub const fn negate(self) -> Self {
        Self(-self.0)
    }

    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AmountOverflow` if the sum does not fit in an
    /// `i64`.
    pub fn checked_add(self, other: Self) -> Result<Self, DomainError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(DomainError::AmountOverflow {
                operation: "adding settlement amounts",
            })
    }

    /// Checked subtraction.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AmountOverflow` if the difference does not fit
    /// in an `i64`.
    pub fn checked_sub(self, other: Self) -> Result<Self, DomainError> {
        self.0
            .checked_sub(other.0)
            .map(Self)
            .ok_or(DomainError::AmountOverflow {
                operation: "subtracting settlement amounts",
            })
    }

    /// Multiplies by `numerator / denominator`, rounding half away from zero.
    ///
    /// This is the single rounding point for line-item computation. The
    /// intermediate product is carried in `i128`, so any realistic salary
    /// multiplied by rate-times-months factors cannot overflow.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AmountOverflow` if the denominator is zero or
    /// the rounded result does not fit in an `i64`.
    pub fn prorate(self, numerator: i64, denominator: i64) -> Result<Self, DomainError> {
        if denominator == 0 {
            return Err(DomainError::AmountOverflow {
                operation: "prorating by a zero denominator",
            });
        }

        let product: i128 = i128::from(self.0) * i128::from(numerator);
        let den: i128 = i128::from(denominator).abs();
        let signed_den: i128 = i128::from(denominator);

        // Round half away from zero: bias the magnitude by half the
        // denominator before truncating division.
        let magnitude: i128 = (product / signed_den).abs();
        let remainder: i128 = (product % signed_den).abs();
        let rounded_magnitude: i128 = if remainder * 2 >= den {
            magnitude + 1
        } else {
            magnitude
        };

        let negative: bool = (product < 0) != (signed_den < 0);
        let rounded: i128 = if negative {
            -rounded_magnitude
        } else {
            rounded_magnitude
        };

        i64::try_from(rounded)
            .map(Self)
            .map_err(|_| DomainError::AmountOverflow {
                operation: "prorating a settlement amount",
            })
    }

    /// Sums a sequence of amounts with overflow checking.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AmountOverflow` if the running sum overflows.
    pub fn checked_sum<I: IntoIterator<Item = Self>>(amounts: I) -> Result<Self, DomainError> {
        let mut total: Self = Self::ZERO;
        for amount in amounts {
            total = total.checked_add(amount)?;
        }
        Ok(total)
    }

    /// Returns the larger of two amounts.
    #[must_use]
    pub const fn max(self, other: Self) -> Self {
        if self.0 >= other.0 { self } else { other }
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prorate_exact_division() {
        let amount: Money = Money::from_minor(300_000);
        assert_eq!(amount.prorate(1, 12).unwrap(), Money::from_minor(25_000));
    }

    #[test]
    fn test_prorate_rounds_half_up() {
        // 100 * 1 / 8 = 12.5 -> 13
        let amount: Money = Money::from_minor(100);
        assert_eq!(amount.prorate(1, 8).unwrap(), Money::from_minor(13));
    }

    #[test]
    fn test_prorate_rounds_down_below_half() {
        // 100 * 1 / 3 = 33.33 -> 33
        let amount: Money = Money::from_minor(100);
        assert_eq!(amount.prorate(1, 3).unwrap(), Money::from_minor(33));
    }

    #[test]
    fn test_prorate_negative_rounds_away_from_zero() {
        // -100 / 8 = -12.5 -> -13
        let amount: Money = Money::from_minor(-100);
        assert_eq!(amount.prorate(1, 8).unwrap(), Money::from_minor(-13));
    }

    #[test]
    fn test_prorate_zero_denominator_is_an_error() {
        let amount: Money = Money::from_minor(100);
        assert!(amount.prorate(1, 0).is_err());
    }

    #[test]
    fn test_prorate_large_product_uses_wide_intermediate() {
        // Rate-times-months factors on a large salary must not overflow.
        let amount: Money = Money::from_minor(50_000_000_000);
        let result: Money = amount.prorate(40 * 480, 1200).unwrap();
        assert_eq!(result, Money::from_minor(800_000_000_000));
    }

    #[test]
    fn test_checked_add_overflow() {
        let amount: Money = Money::from_minor(i64::MAX);
        assert!(amount.checked_add(Money::from_minor(1)).is_err());
    }

    #[test]
    fn test_checked_sum() {
        let total: Money = Money::checked_sum([
            Money::from_minor(10),
            Money::from_minor(-3),
            Money::from_minor(5),
        ])
        .unwrap();
        assert_eq!(total, Money::from_minor(12));
    }

    #[test]
    fn test_max() {
        assert_eq!(
            Money::from_minor(5).max(Money::from_minor(7)),
            Money::from_minor(7)
        );
        assert_eq!(
            Money::from_minor(-5).max(Money::ZERO),
            Money::ZERO
        );
    }
}
