// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Statutory deduction seam.
//!
//! Deduction computation (social contributions, payroll tax on the final
//! settlement) belongs to an external collaborator. The calculator only
//! needs the total deduction for a gross amount, so the seam is a single
//! trait with stand-in implementations.

use crate::money::Money;
use crate::types::CountryCode;

/// Computes the statutory deductions to subtract from a gross settlement.
///
/// Implementations must be deterministic: the preview/confirm contract
/// requires identical inputs to produce identical nets.
pub trait StatutoryDeductions: Send + Sync {
    /// Returns the total deduction for a gross settlement amount.
    fn deductions_for(&self, gross_total: Money, country: CountryCode) -> Money;
}

/// A deduction provider that deducts nothing.
///
/// Used when the external deduction collaborator is not wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroDeductions;

impl StatutoryDeductions for ZeroDeductions {
    fn deductions_for(&self, _gross_total: Money, _country: CountryCode) -> Money {
        Money::ZERO
    }
}

/// A flat-rate deduction provider, expressed in basis points of the gross.
///
/// Deterministic stand-in for integration tests and demo deployments.
#[derive(Debug, Clone, Copy)]
pub struct FlatRateDeductions {
    /// Deduction rate in basis points (1/100 of a percent).
    basis_points: u16,
}

impl FlatRateDeductions {
    /// Creates a flat-rate provider.
    #[must_use]
    pub const fn new(basis_points: u16) -> Self {
        Self { basis_points }
    }
}

impl StatutoryDeductions for FlatRateDeductions {
    fn deductions_for(&self, gross_total: Money, _country: CountryCode) -> Money {
        gross_total
            .prorate(i64::from(self.basis_points), 10_000)
            .unwrap_or(Money::ZERO)
    }
}
