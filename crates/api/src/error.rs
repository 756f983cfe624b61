// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use solde::CoreError;
use solde_domain::DomainError;

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API
/// contract: validation and conflict errors surface synchronously to the
/// caller and never enter persisted job state.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// The operation conflicts with the case's current status.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The settlement computation failed.
    ComputationFailed {
        /// A description of the computation failure.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::ComputationFailed { message } => {
                write!(f, "Settlement computation failed: {message}")
            }
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked
/// directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::FaultCategoryNotAllowed { .. } => ApiError::DomainRuleViolation {
            rule: String::from("fault_category_scope"),
            message: err.to_string(),
        },
        DomainError::NegotiatedAmountNotAllowed { .. }
        | DomainError::NegativeNegotiatedAmount { .. } => ApiError::DomainRuleViolation {
            rule: String::from("negotiated_amount_scope"),
            message: err.to_string(),
        },
        DomainError::BeneficiariesNotAllowed { .. }
        | DomainError::MissingBeneficiaries
        | DomainError::BeneficiarySharesInvalid { .. }
        | DomainError::InvalidBeneficiaryShare { .. } => ApiError::DomainRuleViolation {
            rule: String::from("beneficiary_shares"),
            message: err.to_string(),
        },
        DomainError::EmptySalaryHistory => ApiError::ResourceNotFound {
            resource_type: String::from("Salary history"),
            message: String::from("The employee has no recorded salary history"),
        },
        DomainError::NonPositiveAverageSalary { .. } => ApiError::InvalidInput {
            field: String::from("monthly_gross_salaries"),
            message: err.to_string(),
        },
        DomainError::NonPositiveServiceYears { .. } => ApiError::InvalidInput {
            field: String::from("years_of_service"),
            message: err.to_string(),
        },
        DomainError::UnsupportedCountry { .. } | DomainError::AmountOverflow { .. } => {
            ApiError::ComputationFailed {
                message: err.to_string(),
            }
        }
        DomainError::InvalidDepartureClass(_) => ApiError::InvalidInput {
            field: String::from("classification"),
            message: err.to_string(),
        },
        DomainError::InvalidNoticeDisposition(_) => ApiError::InvalidInput {
            field: String::from("notice_disposition"),
            message: err.to_string(),
        },
        DomainError::InvalidFaultCategory(_) => ApiError::InvalidInput {
            field: String::from("fault_category"),
            message: err.to_string(),
        },
        DomainError::InvalidEmployeeCategory(_) => ApiError::InvalidInput {
            field: String::from("category"),
            message: err.to_string(),
        },
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::DuplicateProcessing { .. } | CoreError::InvalidTransition { .. } => {
            ApiError::Conflict {
                message: err.to_string(),
            }
        }
        CoreError::NonMonotonicProgress { .. }
        | CoreError::IncompleteDocuments { .. }
        | CoreError::MissingResult
        | CoreError::InvalidStatus(_) => ApiError::Internal {
            message: err.to_string(),
        },
    }
}
