// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::documents::DocumentKind;
use crate::state::CaseStatus;
use solde_domain::DomainError;

/// Errors that can occur during case transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// A processing run was requested while one is already in flight.
    DuplicateProcessing {
        /// The in-flight status that blocked the request.
        status: CaseStatus,
    },
    /// The requested transition is not permitted by the lifecycle.
    InvalidTransition {
        /// The current status.
        from: CaseStatus,
        /// The requested status.
        to: CaseStatus,
    },
    /// A progress update would move the percentage backwards.
    NonMonotonicProgress {
        /// The current progress percentage.
        current: u8,
        /// The requested (lower) percentage.
        requested: u8,
    },
    /// Completion was requested with document references missing.
    IncompleteDocuments {
        /// The document kinds without references.
        missing: Vec<DocumentKind>,
    },
    /// Completion was requested before a settlement result was recorded.
    MissingResult,
    /// A persisted status string is not recognized.
    InvalidStatus(String),
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::DuplicateProcessing { status } => {
                write!(
                    f,
                    "Case is already {status}; a new run cannot be requested until it finishes"
                )
            }
            Self::InvalidTransition { from, to } => {
                write!(f, "Invalid case transition from {from} to {to}")
            }
            Self::NonMonotonicProgress { current, requested } => {
                write!(
                    f,
                    "Progress may not decrease: currently at {current}%, requested {requested}%"
                )
            }
            Self::IncompleteDocuments { missing } => {
                let names: Vec<&str> = missing.iter().map(DocumentKind::as_str).collect();
                write!(
                    f,
                    "Cannot complete case: missing document references for {}",
                    names.join(", ")
                )
            }
            Self::MissingResult => {
                write!(f, "Cannot complete case: no settlement result recorded")
            }
            Self::InvalidStatus(s) => write!(f, "Invalid case status: '{s}'"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
