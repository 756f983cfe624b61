// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::documents::DocumentKind;
use crate::progress::ProcessingStep;
use solde_domain::SettlementResult;

/// A command represents operator or worker intent as data only.
///
/// Commands are the only way to request case transitions; `apply` turns a
/// command into a guarded transition plus its audit event. Timestamps are
/// supplied by the caller so transitions stay pure.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Request a (re)processing run: `idle`/`completed`/`failed` → `pending`.
    RequestProcessing {
        /// Issuer recorded on the generated documents.
        issuer: String,
        /// Pay date recorded on the generated documents (ISO 8601).
        pay_date: String,
        /// Whether to discard the frozen result and recompute.
        recompute: bool,
        /// When the request was made (ISO 8601).
        requested_at: String,
    },
    /// The worker claims the enqueued job: `pending` → `processing`.
    ClaimJob {
        /// When the job was claimed (ISO 8601).
        claimed_at: String,
    },
    /// Advance the progress checkpoint within `processing`.
    RecordProgress {
        /// The stage being entered.
        step: ProcessingStep,
    },
    /// Freeze the calculated settlement on the case.
    RecordResult {
        /// The calculated settlement.
        result: SettlementResult,
    },
    /// Record a generated document's artifact reference.
    AttachDocument {
        /// The document kind.
        kind: DocumentKind,
        /// The artifact reference.
        reference: String,
    },
    /// Finish the run: `processing` → `completed`.
    CompleteCase {
        /// When the run completed (ISO 8601).
        completed_at: String,
    },
    /// Fail the run: `processing` → `failed`. Progress is preserved.
    FailCase {
        /// Operator-visible explanation of the failure.
        error: String,
    },
}

impl Command {
    /// Returns the audit action name for this command.
    #[must_use]
    pub const fn action_name(&self) -> &'static str {
        match self {
            Self::RequestProcessing { .. } => "RequestProcessing",
            Self::ClaimJob { .. } => "ClaimJob",
            Self::RecordProgress { .. } => "RecordProgress",
            Self::RecordResult { .. } => "RecordResult",
            Self::AttachDocument { .. } => "AttachDocument",
            Self::CompleteCase { .. } => "CompleteCase",
            Self::FailCase { .. } => "FailCase",
        }
    }
}
