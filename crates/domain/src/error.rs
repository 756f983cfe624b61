// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during settlement validation and calculation.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// A fault subtype was supplied for a classification other than dismissal.
    FaultCategoryNotAllowed {
        /// The offending classification.
        classification: String,
    },
    /// A negotiated amount was supplied for a classification other than
    /// negotiated termination.
    NegotiatedAmountNotAllowed {
        /// The offending classification.
        classification: String,
    },
    /// The negotiated amount is negative.
    NegativeNegotiatedAmount {
        /// The offending amount in minor units.
        amount: i64,
    },
    /// Beneficiaries were supplied for a classification other than death.
    BeneficiariesNotAllowed {
        /// The offending classification.
        classification: String,
    },
    /// A death settlement was requested without beneficiaries.
    MissingBeneficiaries,
    /// Beneficiary shares do not sum to exactly 100.
    BeneficiarySharesInvalid {
        /// The actual sum of the declared shares.
        total: u32,
    },
    /// A beneficiary share is zero or exceeds 100.
    InvalidBeneficiaryShare {
        /// The beneficiary's name.
        name: String,
        /// The offending share percentage.
        share: u8,
    },
    /// The employee has no recorded salary history.
    EmptySalaryHistory,
    /// The trailing average salary is zero or negative.
    NonPositiveAverageSalary {
        /// The computed average in minor units.
        average: i64,
    },
    /// Years of service is zero or negative.
    NonPositiveServiceYears {
        /// The offending value.
        years: f64,
    },
    /// No compliance tables exist for the requested country.
    UnsupportedCountry {
        /// The requested country code.
        country: String,
    },
    /// Departure classification string is not recognized.
    InvalidDepartureClass(String),
    /// Notice disposition string is not recognized.
    InvalidNoticeDisposition(String),
    /// Fault category string is not recognized.
    InvalidFaultCategory(String),
    /// Employee category string is not recognized.
    InvalidEmployeeCategory(String),
    /// Monetary arithmetic overflowed.
    AmountOverflow {
        /// Description of the operation that overflowed.
        operation: &'static str,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FaultCategoryNotAllowed { classification } => {
                write!(
                    f,
                    "Fault category is only permitted for dismissals, not '{classification}'"
                )
            }
            Self::NegotiatedAmountNotAllowed { classification } => {
                write!(
                    f,
                    "Negotiated amount is only permitted for negotiated terminations, not '{classification}'"
                )
            }
            Self::NegativeNegotiatedAmount { amount } => {
                write!(f, "Negotiated amount must not be negative, got {amount}")
            }
            Self::BeneficiariesNotAllowed { classification } => {
                write!(
                    f,
                    "Beneficiaries are only permitted for death settlements, not '{classification}'"
                )
            }
            Self::MissingBeneficiaries => {
                write!(f, "A death settlement requires at least one beneficiary")
            }
            Self::BeneficiarySharesInvalid { total } => {
                write!(
                    f,
                    "Beneficiary shares must sum to exactly 100, got {total}"
                )
            }
            Self::InvalidBeneficiaryShare { name, share } => {
                write!(
                    f,
                    "Beneficiary '{name}' has an invalid share of {share}%; shares must be between 1 and 100"
                )
            }
            Self::EmptySalaryHistory => {
                write!(f, "No salary history is available for the employee")
            }
            Self::NonPositiveAverageSalary { average } => {
                write!(
                    f,
                    "Average trailing salary must be positive, got {average}"
                )
            }
            Self::NonPositiveServiceYears { years } => {
                write!(f, "Years of service must be positive, got {years}")
            }
            Self::UnsupportedCountry { country } => {
                write!(f, "No compliance tables exist for country '{country}'")
            }
            Self::InvalidDepartureClass(s) => {
                write!(f, "Invalid departure classification: '{s}'")
            }
            Self::InvalidNoticeDisposition(s) => {
                write!(f, "Invalid notice disposition: '{s}'")
            }
            Self::InvalidFaultCategory(s) => {
                write!(f, "Invalid fault category: '{s}'")
            }
            Self::InvalidEmployeeCategory(s) => {
                write!(f, "Invalid employee category: '{s}'")
            }
            Self::AmountOverflow { operation } => {
                write!(f, "Monetary arithmetic overflow while {operation}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
