// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Processing-step ladder for progress reporting.
//!
//! Each stage of a run maps to a fixed progress checkpoint and a
//! human-readable label. Percentages only ever increase within a run; on
//! failure the case keeps the last checkpoint it reached.

use crate::documents::DocumentKind;
use serde::{Deserialize, Serialize};

/// The stages of a termination-case run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStep {
    /// Enqueued, waiting for the worker.
    Queued,
    /// Claimed by the worker.
    Claimed,
    /// Validating the recorded request and employee data.
    ValidatingRequest,
    /// Running the settlement calculation.
    CalculatingSettlement,
    /// Generating the work certificate.
    GeneratingWorkCertificate,
    /// Generating the final payslip.
    GeneratingFinalPayslip,
    /// Generating the statutory-fund attestation.
    GeneratingFundAttestation,
    /// Recording generated artifacts.
    PersistingArtifacts,
    /// Run finished.
    Completed,
}

impl ProcessingStep {
    /// Returns the progress checkpoint for this step.
    #[must_use]
    pub const fn percent(&self) -> u8 {
        match self {
            Self::Queued => 0,
            Self::Claimed => 5,
            Self::ValidatingRequest => 10,
            Self::CalculatingSettlement => 30,
            Self::GeneratingWorkCertificate => 50,
            Self::GeneratingFinalPayslip => 65,
            Self::GeneratingFundAttestation => 80,
            Self::PersistingArtifacts => 95,
            Self::Completed => 100,
        }
    }

    /// Returns the human-readable label shown to polling clients.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Queued => "Waiting for worker",
            Self::Claimed => "Claimed by worker",
            Self::ValidatingRequest => "Validating termination request",
            Self::CalculatingSettlement => "Calculating severance and settlement",
            Self::GeneratingWorkCertificate => "Generating work certificate",
            Self::GeneratingFinalPayslip => "Generating final payslip",
            Self::GeneratingFundAttestation => "Generating statutory fund attestation",
            Self::PersistingArtifacts => "Recording generated documents",
            Self::Completed => "Completed",
        }
    }

    /// Returns the generation step for a document kind.
    #[must_use]
    pub const fn for_document(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::WorkCertificate => Self::GeneratingWorkCertificate,
            DocumentKind::FinalPayslip => Self::GeneratingFinalPayslip,
            DocumentKind::FundAttestation => Self::GeneratingFundAttestation,
        }
    }
}
