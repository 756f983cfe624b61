// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Structural validation of settlement requests.
//!
//! Validation runs before any state mutation: a request that fails here
//! never reaches the calculator or the persisted workflow.

use crate::error::DomainError;
use crate::types::{Beneficiary, DepartureClass, SettlementRequest};

/// Validates the cross-field invariants of a settlement request.
///
/// - a fault subtype is only permitted when the classification is dismissal
/// - a negotiated amount is only permitted for negotiated terminations, and
///   must not be negative
/// - beneficiaries are only permitted for death, where at least one is
///   required and the shares must sum to exactly 100
///
/// # Errors
///
/// Returns the first violated invariant as a `DomainError`.
pub fn validate_settlement_request(request: &SettlementRequest) -> Result<(), DomainError> {
    if request.fault_category.is_some() && request.classification != DepartureClass::Dismissal {
        return Err(DomainError::FaultCategoryNotAllowed {
            classification: request.classification.as_str().to_string(),
        });
    }

    match request.negotiated_amount {
        Some(_) if request.classification != DepartureClass::NegotiatedTermination => {
            return Err(DomainError::NegotiatedAmountNotAllowed {
                classification: request.classification.as_str().to_string(),
            });
        }
        Some(amount) if amount.minor() < 0 => {
            return Err(DomainError::NegativeNegotiatedAmount {
                amount: amount.minor(),
            });
        }
        _ => {}
    }

    if request.classification == DepartureClass::Death {
        validate_beneficiaries(&request.beneficiaries)?;
    } else if !request.beneficiaries.is_empty() {
        return Err(DomainError::BeneficiariesNotAllowed {
            classification: request.classification.as_str().to_string(),
        });
    }

    Ok(())
}

/// Validates a beneficiary list for a death settlement.
///
/// # Errors
///
/// Returns an error if the list is empty, any share is out of range, or the
/// shares do not sum to exactly 100.
pub fn validate_beneficiaries(beneficiaries: &[Beneficiary]) -> Result<(), DomainError> {
    if beneficiaries.is_empty() {
        return Err(DomainError::MissingBeneficiaries);
    }

    for beneficiary in beneficiaries {
        if beneficiary.share_percent == 0 || beneficiary.share_percent > 100 {
            return Err(DomainError::InvalidBeneficiaryShare {
                name: beneficiary.name.clone(),
                share: beneficiary.share_percent,
            });
        }
    }

    let total: u32 = beneficiaries
        .iter()
        .map(|b| u32::from(b.share_percent))
        .sum();
    if total != 100 {
        return Err(DomainError::BeneficiarySharesInvalid { total });
    }

    Ok(())
}
