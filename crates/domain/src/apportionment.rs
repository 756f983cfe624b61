// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Beneficiary apportionment of a deceased employee's net settlement.
//!
//! Each beneficiary's amount is floored to the minor currency unit; the
//! rounding remainder goes to the first-listed beneficiary. The apportioned
//! amounts therefore always sum exactly to the net total, with no rounding
//! leakage.

use crate::error::DomainError;
use crate::money::Money;
use crate::types::Beneficiary;
use crate::validation::validate_beneficiaries;
use serde::{Deserialize, Serialize};

/// One beneficiary's apportioned part of the net settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeneficiaryShare {
    /// The beneficiary's name.
    pub name: String,
    /// Relationship to the deceased.
    pub relationship: String,
    /// Reference to the bank account receiving the amount.
    pub bank_account_ref: String,
    /// The declared whole-percent share.
    pub share_percent: u8,
    /// The apportioned amount in minor units.
    pub amount: Money,
}

/// Apportions a net total across beneficiaries by declared share.
///
/// # Errors
///
/// Returns an error if the beneficiary list fails validation (empty list,
/// out-of-range share, shares not summing to 100).
pub fn apportion_net_total(
    net_total: Money,
    beneficiaries: &[Beneficiary],
) -> Result<Vec<BeneficiaryShare>, DomainError> {
    validate_beneficiaries(beneficiaries)?;

    let net: i128 = i128::from(net_total.minor());
    let mut shares: Vec<BeneficiaryShare> = Vec::with_capacity(beneficiaries.len());
    let mut distributed: i128 = 0;

    for beneficiary in beneficiaries {
        // Floor toward negative infinity so the remainder is never negative.
        let amount: i128 = (net * i128::from(beneficiary.share_percent)).div_euclid(100);
        distributed += amount;
        shares.push(BeneficiaryShare {
            name: beneficiary.name.clone(),
            relationship: beneficiary.relationship.clone(),
            bank_account_ref: beneficiary.bank_account_ref.clone(),
            share_percent: beneficiary.share_percent,
            amount: Money::from_minor(to_minor(amount)?),
        });
    }

    let remainder: i128 = net - distributed;
    if let Some(first) = shares.first_mut() {
        first.amount = Money::from_minor(to_minor(i128::from(first.amount.minor()) + remainder)?);
    }

    Ok(shares)
}

fn to_minor(amount: i128) -> Result<i64, DomainError> {
    i64::try_from(amount).map_err(|_| DomainError::AmountOverflow {
        operation: "apportioning the net total",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beneficiary(name: &str, share: u8) -> Beneficiary {
        Beneficiary {
            name: name.to_string(),
            relationship: String::from("child"),
            identity_document_ref: format!("id-{name}"),
            bank_account_ref: format!("acct-{name}"),
            share_percent: share,
        }
    }

    #[test]
    fn test_even_split_sums_exactly() {
        let shares =
            apportion_net_total(Money::from_minor(100_000), &[beneficiary("a", 50), beneficiary("b", 50)])
                .unwrap();
        assert_eq!(shares[0].amount, Money::from_minor(50_000));
        assert_eq!(shares[1].amount, Money::from_minor(50_000));
    }

    #[test]
    fn test_rounding_remainder_goes_to_first_beneficiary() {
        // 100 / 3-way 33/33/34: 33 + 33 + 34 = 100 exactly, but
        // 1000001 split 33/33/34 leaves a remainder after flooring.
        let shares = apportion_net_total(
            Money::from_minor(1_000_001),
            &[
                beneficiary("a", 33),
                beneficiary("b", 33),
                beneficiary("c", 34),
            ],
        )
        .unwrap();

        let total: i64 = shares.iter().map(|s| s.amount.minor()).sum();
        assert_eq!(total, 1_000_001);

        // Floored shares are 330000, 330000, 340000; the remainder of 1
        // lands on the first beneficiary.
        assert_eq!(shares[0].amount, Money::from_minor(330_001));
        assert_eq!(shares[1].amount, Money::from_minor(330_000));
        assert_eq!(shares[2].amount, Money::from_minor(340_000));
    }

    #[test]
    fn test_apportionment_is_exact_across_awkward_totals() {
        for net in [1i64, 7, 99, 101, 12_345, 999_999_999] {
            let shares = apportion_net_total(
                Money::from_minor(net),
                &[
                    beneficiary("a", 17),
                    beneficiary("b", 29),
                    beneficiary("c", 54),
                ],
            )
            .unwrap();
            let total: i64 = shares.iter().map(|s| s.amount.minor()).sum();
            assert_eq!(total, net, "net {net} leaked during apportionment");
        }
    }

    #[test]
    fn test_invalid_shares_rejected() {
        let err = apportion_net_total(
            Money::from_minor(1_000),
            &[beneficiary("a", 60), beneficiary("b", 30)],
        )
        .unwrap_err();
        assert_eq!(err, DomainError::BeneficiarySharesInvalid { total: 90 });
    }

    #[test]
    fn test_empty_beneficiaries_rejected() {
        let err = apportion_net_total(Money::from_minor(1_000), &[]).unwrap_err();
        assert_eq!(err, DomainError::MissingBeneficiaries);
    }

    #[test]
    fn test_single_beneficiary_receives_everything() {
        let shares =
            apportion_net_total(Money::from_minor(123_457), &[beneficiary("only", 100)]).unwrap();
        assert_eq!(shares.len(), 1);
        assert_eq!(shares[0].amount, Money::from_minor(123_457));
    }
}
