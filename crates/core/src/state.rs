// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Termination-case lifecycle state.
//!
//! A case moves `idle → pending → processing → {completed | failed}`.
//! Completed and failed cases may re-enter `pending` for document
//! regeneration, but never `processing` directly: the claim step is what
//! serializes workers.

use crate::documents::DocumentKind;
use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use solde_audit::{AuditEvent, StateSnapshot};
use solde_domain::{EmployeeId, SettlementRequest, SettlementResult, TenantId};
use std::str::FromStr;

/// Processing status of a termination case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Created but never enqueued.
    Idle,
    /// Enqueued; waiting for the background worker to claim it.
    Pending,
    /// Claimed by the worker; stages are running.
    Processing,
    /// All stages finished and every document reference is recorded.
    Completed,
    /// A stage failed; the error message records why.
    Failed,
}

impl CaseStatus {
    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parses a status from its string representation.
    fn parse_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "idle" => Ok(Self::Idle),
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(CoreError::InvalidStatus(s.to_string())),
        }
    }

    /// Returns true while a run is enqueued or executing.
    ///
    /// A case in flight must not be enqueued again; this is the
    /// duplicate-start guard.
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }

    /// Returns true when a new processing run may be requested.
    #[must_use]
    pub const fn can_request_processing(&self) -> bool {
        matches!(self, Self::Idle | Self::Completed | Self::Failed)
    }

    /// Checks if a transition from this status to another is valid.
    ///
    /// Valid transitions are:
    /// - Idle → Pending
    /// - Pending → Processing
    /// - Processing → Completed
    /// - Processing → Failed
    /// - Completed → Pending (regeneration)
    /// - Failed → Pending (retry/regeneration)
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Idle | Self::Completed | Self::Failed, Self::Pending)
                | (Self::Pending, Self::Processing)
                | (Self::Processing, Self::Completed | Self::Failed)
        )
    }
}

impl FromStr for CaseStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// References to the generated settlement documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRefs {
    /// Work certificate artifact reference.
    pub work_certificate: Option<String>,
    /// Final payslip artifact reference.
    pub final_payslip: Option<String>,
    /// Statutory-fund attestation artifact reference.
    pub fund_attestation: Option<String>,
}

impl DocumentRefs {
    /// Returns the reference for a document kind.
    #[must_use]
    pub fn get(&self, kind: DocumentKind) -> Option<&str> {
        match kind {
            DocumentKind::WorkCertificate => self.work_certificate.as_deref(),
            DocumentKind::FinalPayslip => self.final_payslip.as_deref(),
            DocumentKind::FundAttestation => self.fund_attestation.as_deref(),
        }
    }

    /// Sets the reference for a document kind.
    pub fn set(&mut self, kind: DocumentKind, reference: String) {
        match kind {
            DocumentKind::WorkCertificate => self.work_certificate = Some(reference),
            DocumentKind::FinalPayslip => self.final_payslip = Some(reference),
            DocumentKind::FundAttestation => self.fund_attestation = Some(reference),
        }
    }

    /// Returns true when every required document reference is present.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.work_certificate.is_some()
            && self.final_payslip.is_some()
            && self.fund_attestation.is_some()
    }

    /// Returns the document kinds that are still missing.
    #[must_use]
    pub fn missing_kinds(&self) -> Vec<DocumentKind> {
        DocumentKind::ALL
            .iter()
            .copied()
            .filter(|kind| self.get(*kind).is_none())
            .collect()
    }
}

/// The persisted, mutable termination-case aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminationCase {
    /// The persisted case identifier. `None` before first persistence.
    pub case_id: Option<i64>,
    /// The tenant this case belongs to.
    pub tenant_id: TenantId,
    /// The employee being terminated.
    pub employee_id: EmployeeId,
    /// The settlement request recorded for this termination.
    pub request: SettlementRequest,
    /// Current processing status.
    pub status: CaseStatus,
    /// Progress percentage, 0-100, monotonically non-decreasing per run.
    pub progress_percent: u8,
    /// Human-readable description of the current step.
    pub current_step: String,
    /// Error message of the last failed run, if any.
    pub error_message: Option<String>,
    /// When the current/last run was claimed (ISO 8601).
    pub started_at: Option<String>,
    /// When the last run completed (ISO 8601).
    pub completed_at: Option<String>,
    /// Frozen settlement result, once computed.
    pub result: Option<SettlementResult>,
    /// References to the generated documents.
    pub documents: DocumentRefs,
    /// Version counter of the generated document set.
    pub document_version: u32,
    /// Handle correlating the case with its background run.
    pub job_handle: Option<String>,
    /// Issuer recorded for the documents of the requested run.
    pub issuer: Option<String>,
    /// Pay date recorded for the documents of the requested run (ISO 8601).
    pub pay_date: Option<String>,
}

impl TerminationCase {
    /// Creates a new case in `idle` for a recorded termination.
    #[must_use]
    pub fn new(request: SettlementRequest) -> Self {
        Self {
            case_id: None,
            tenant_id: request.tenant_id.clone(),
            employee_id: request.employee_id.clone(),
            request,
            status: CaseStatus::Idle,
            progress_percent: 0,
            current_step: String::new(),
            error_message: None,
            started_at: None,
            completed_at: None,
            result: None,
            documents: DocumentRefs::default(),
            document_version: 0,
            job_handle: None,
            issuer: None,
            pay_date: None,
        }
    }

    /// Converts the case to a snapshot for audit purposes.
    #[must_use]
    pub fn to_snapshot(&self) -> StateSnapshot {
        StateSnapshot::new(format!(
            "case={},status={},progress={},step={},version={}",
            self.case_id.unwrap_or(0),
            self.status,
            self.progress_percent,
            self.current_step,
            self.document_version,
        ))
    }
}

/// The result of a successful case transition.
///
/// Transitions are atomic: the persistence layer writes the new state and
/// the audit event together, conditioned on the prior status still holding.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult {
    /// The status the case held before the transition. The conditional
    /// persisted update is guarded on this value.
    pub prior_status: CaseStatus,
    /// The new case state after the transition.
    pub new_case: TerminationCase,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}
