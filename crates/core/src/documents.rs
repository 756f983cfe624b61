// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Document-generation seam.
//!
//! Rendering the settlement into PDF/URL artifacts belongs to an external
//! collaborator; the workflow only records the returned reference IDs. The
//! stub implementation produces deterministic references so the pipeline is
//! fully exercisable without the renderer.

use crate::state::TerminationCase;
use serde::{Deserialize, Serialize};
use solde_domain::SettlementResult;
use std::str::FromStr;
use time::Date;

/// The document kinds a completed settlement must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Work certificate (certificat de travail).
    WorkCertificate,
    /// Final payslip covering the settlement amounts.
    FinalPayslip,
    /// Statutory-fund attestation for the social security institution.
    FundAttestation,
}

impl DocumentKind {
    /// Every required document kind, in generation order.
    pub const ALL: [Self; 3] = [Self::WorkCertificate, Self::FinalPayslip, Self::FundAttestation];

    /// Returns the string representation used for persistence and the API.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::WorkCertificate => "work_certificate",
            Self::FinalPayslip => "final_payslip",
            Self::FundAttestation => "fund_attestation",
        }
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "work_certificate" => Ok(Self::WorkCertificate),
            "final_payslip" => Ok(Self::FinalPayslip),
            "fund_attestation" => Ok(Self::FundAttestation),
            _ => Err(format!("Invalid document kind: '{s}'")),
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything the renderer needs to produce one document.
#[derive(Debug, Clone, Copy)]
pub struct DocumentContext<'a> {
    /// The case the document belongs to.
    pub case: &'a TerminationCase,
    /// The frozen settlement the document renders.
    pub result: &'a SettlementResult,
    /// The issuing officer or service recorded on the document.
    pub issuer: &'a str,
    /// The pay date printed on the payslip and attestation.
    pub pay_date: Date,
    /// The document set version being generated.
    pub version: u32,
}

/// A generated document artifact reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedDocument {
    /// The document kind.
    pub kind: DocumentKind,
    /// The artifact reference recorded for the case.
    pub reference: String,
}

/// Failure to render one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentError {
    /// The document kind that failed.
    pub kind: DocumentKind,
    /// Why rendering failed.
    pub reason: String,
}

impl std::fmt::Display for DocumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to generate {}: {}", self.kind, self.reason)
    }
}

impl std::error::Error for DocumentError {}

/// Renders settlement documents and returns artifact references.
///
/// Implementations may be remote services; the workflow treats every error
/// as a per-document failure and enumerates the failed kinds on the case.
pub trait DocumentGenerator: Send + Sync {
    /// Generates one document for a case.
    ///
    /// # Errors
    ///
    /// Returns a `DocumentError` naming the failed kind.
    fn generate(
        &self,
        kind: DocumentKind,
        ctx: &DocumentContext<'_>,
    ) -> Result<GeneratedDocument, DocumentError>;
}

/// Deterministic stand-in for the external document renderer.
///
/// References encode the case, kind, and version, so regeneration produces
/// new references without touching the settlement numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubDocumentGenerator;

impl DocumentGenerator for StubDocumentGenerator {
    fn generate(
        &self,
        kind: DocumentKind,
        ctx: &DocumentContext<'_>,
    ) -> Result<GeneratedDocument, DocumentError> {
        let case_id: i64 = ctx.case.case_id.unwrap_or(0);
        Ok(GeneratedDocument {
            kind,
            reference: format!("{}-case{}-v{}", kind.as_str(), case_id, ctx.version),
        })
    }
}

/// A generator that fails for a configured set of kinds.
///
/// Test double for partial-failure behavior: a case with any failed
/// document must end `failed`, never partially `completed`.
#[derive(Debug, Clone, Default)]
pub struct FailingDocumentGenerator {
    /// The kinds that fail to render.
    failing: Vec<DocumentKind>,
}

impl FailingDocumentGenerator {
    /// Creates a generator failing for the given kinds.
    #[must_use]
    pub const fn new(failing: Vec<DocumentKind>) -> Self {
        Self { failing }
    }
}

impl DocumentGenerator for FailingDocumentGenerator {
    fn generate(
        &self,
        kind: DocumentKind,
        ctx: &DocumentContext<'_>,
    ) -> Result<GeneratedDocument, DocumentError> {
        if self.failing.contains(&kind) {
            return Err(DocumentError {
                kind,
                reason: String::from("renderer unavailable"),
            });
        }
        StubDocumentGenerator.generate(kind, ctx)
    }
}
