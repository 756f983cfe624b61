// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request and response types for the API boundary.
//!
//! Enum-valued fields travel as strings and are parsed here; parse failures
//! surface as `InvalidInput` naming the field.

use crate::error::{ApiError, translate_domain_error};
use serde::{Deserialize, Serialize};
use solde::{CaseStatus, TerminationCase};
use solde_domain::{
    Beneficiary, CountryCode, EmployeeCategory, EmployeeId, EmployeeProfile, Money,
    SettlementRequest, SettlementResult, TenantId,
};
use thiserror::Error;
use time::Date;
use time::format_description::well_known::{Iso8601, Rfc3339};

/// A structurally invalid request field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The field is required but empty.
    #[error("'{field}' must not be empty")]
    Empty {
        /// The offending field.
        field: &'static str,
    },
    /// The field failed to parse.
    #[error("'{field}': {message}")]
    Unparseable {
        /// The offending field.
        field: &'static str,
        /// Why parsing failed.
        message: String,
    },
}

impl FieldError {
    /// Returns the offending field name.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty { field } | Self::Unparseable { field, .. } => field,
        }
    }
}

impl From<FieldError> for ApiError {
    fn from(err: FieldError) -> Self {
        Self::InvalidInput {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

/// A beneficiary as it travels over the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeneficiaryDto {
    /// Full name.
    pub name: String,
    /// Relationship to the deceased.
    pub relationship: String,
    /// Identity document reference.
    pub identity_document_ref: String,
    /// Bank account reference.
    pub bank_account_ref: String,
    /// Whole-percent share of the net total.
    pub share_percent: u8,
}

/// Request body recording a termination and its settlement inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCaseRequest {
    /// The operator recording the termination.
    pub actor_id: String,
    /// The tenant.
    pub tenant_id: String,
    /// The departing employee.
    pub employee_id: String,
    /// Departure classification (string form).
    pub classification: String,
    /// Termination date (ISO 8601).
    pub termination_date: String,
    /// Notice disposition (string form).
    pub notice_disposition: String,
    /// Optional dismissal-fault subtype (string form).
    #[serde(default)]
    pub fault_category: Option<String>,
    /// Optional negotiated amount in minor units.
    #[serde(default)]
    pub negotiated_amount_minor: Option<i64>,
    /// Beneficiaries (death only).
    #[serde(default)]
    pub beneficiaries: Vec<BeneficiaryDto>,
}

/// Response for a created case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCaseResponse {
    /// The persisted case ID.
    pub case_id: i64,
}

/// Request body upserting an employee profile and salary history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertEmployeeRequest {
    /// The operator recording the profile.
    pub actor_id: String,
    /// The tenant.
    pub tenant_id: String,
    /// The employee.
    pub employee_id: String,
    /// Governing labor-law country (ISO 3166-1 alpha-2).
    pub country: String,
    /// Professional category (string form).
    pub category: String,
    /// Trailing monthly gross salaries in minor units, oldest first.
    pub monthly_gross_minor: Vec<i64>,
    /// Accrued untaken vacation days.
    pub accrued_vacation_days: u16,
    /// Fractional years of service.
    pub years_of_service: f64,
    /// Contractual gratification in minor units, if any.
    #[serde(default)]
    pub contractual_gratification_minor: Option<i64>,
}

/// Request body enqueueing a processing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartProcessingRequest {
    /// The operator requesting the run.
    pub actor_id: String,
    /// Issuer recorded on the generated documents.
    pub issuer: String,
    /// Pay date recorded on the documents (ISO 8601).
    pub pay_date: String,
    /// Whether to discard the frozen result and recompute.
    #[serde(default)]
    pub recompute: bool,
}

/// Response for an accepted enqueue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartProcessingResponse {
    /// Whether the run was accepted.
    pub accepted: bool,
    /// Handle correlating the case with the background run.
    pub job_handle: String,
}

/// Request body for a document regeneration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegenerateRequest {
    /// The operator requesting regeneration.
    pub actor_id: String,
    /// Issuer recorded on the regenerated documents.
    pub issuer: String,
    /// Pay date recorded on the documents (ISO 8601).
    pub pay_date: String,
    /// Mandatory non-empty reason, recorded in the audit trail.
    pub reason: String,
    /// Whether to recompute the settlement numbers as well.
    #[serde(default)]
    pub recompute: bool,
}

/// Request body for a synchronous settlement preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewSettlementRequest {
    /// The tenant.
    pub tenant_id: String,
    /// The employee whose persisted salary history the preview reads.
    pub employee_id: String,
    /// Departure classification (string form).
    pub classification: String,
    /// Termination date (ISO 8601).
    pub termination_date: String,
    /// Notice disposition (string form).
    pub notice_disposition: String,
    /// Optional dismissal-fault subtype (string form).
    #[serde(default)]
    pub fault_category: Option<String>,
    /// Optional negotiated amount in minor units.
    #[serde(default)]
    pub negotiated_amount_minor: Option<i64>,
    /// Beneficiaries (death only).
    #[serde(default)]
    pub beneficiaries: Vec<BeneficiaryDto>,
}

/// One beneficiary's apportioned amount, as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeneficiaryShareDto {
    /// The beneficiary's name.
    pub name: String,
    /// Relationship to the deceased.
    pub relationship: String,
    /// Bank account reference.
    pub bank_account_ref: String,
    /// Declared whole-percent share.
    pub share_percent: u8,
    /// Apportioned amount in minor units.
    pub amount_minor: i64,
}

/// The itemized settlement, as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementResultDto {
    /// Severance in minor units.
    pub severance_minor: i64,
    /// Vacation payout in minor units.
    pub vacation_payout_minor: i64,
    /// Gratification in minor units.
    pub gratification_minor: i64,
    /// Prorated final-month salary in minor units.
    pub prorated_salary_minor: i64,
    /// Notice payment in minor units (negative when owed by the employee).
    pub notice_payment_minor: i64,
    /// Gross total in minor units.
    pub gross_total_minor: i64,
    /// Net total in minor units.
    pub net_total_minor: i64,
    /// Fractional years of service used by the calculation.
    pub years_of_service: f64,
    /// Average trailing monthly salary in minor units.
    pub average_monthly_salary_minor: i64,
    /// When the calculation ran (RFC 3339).
    pub calculated_at: String,
    /// Non-fatal compliance warnings.
    pub warnings: Vec<String>,
    /// Per-beneficiary apportionment (death only).
    pub apportionment: Vec<BeneficiaryShareDto>,
}

/// Generated document references, as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRefsDto {
    /// Work certificate reference.
    pub work_certificate: Option<String>,
    /// Final payslip reference.
    pub final_payslip: Option<String>,
    /// Statutory-fund attestation reference.
    pub fund_attestation: Option<String>,
}

/// Poll response: a consistent snapshot of one case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressResponse {
    /// The case ID.
    pub case_id: i64,
    /// Current status (string form).
    pub status: String,
    /// Progress percentage, 0-100.
    pub progress_percent: u8,
    /// Human-readable current step.
    pub current_step: String,
    /// When the current/last run was claimed (RFC 3339).
    pub started_at: Option<String>,
    /// When the last run completed (RFC 3339).
    pub completed_at: Option<String>,
    /// Error message of the last failed run.
    pub error: Option<String>,
    /// Version of the generated document set.
    pub document_version: u32,
    /// Handle correlating the case with the background run.
    pub job_handle: Option<String>,
    /// Frozen settlement result, once computed.
    pub result: Option<SettlementResultDto>,
    /// Document references, once any exist.
    pub documents: Option<DocumentRefsDto>,
}

/// Parses a required ISO 8601 date field.
///
/// # Errors
///
/// Returns a `FieldError` if the field is empty or unparseable.
pub fn parse_date_field(value: &str, field: &'static str) -> Result<Date, FieldError> {
    if value.is_empty() {
        return Err(FieldError::Empty { field });
    }
    Date::parse(value, &Iso8601::DEFAULT).map_err(|e| FieldError::Unparseable {
        field,
        message: e.to_string(),
    })
}

/// Parses a required non-empty string field.
///
/// # Errors
///
/// Returns a `FieldError` if the field is empty.
pub fn require_non_empty(value: &str, field: &'static str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::Empty { field });
    }
    Ok(())
}

fn beneficiary_from_dto(dto: &BeneficiaryDto) -> Beneficiary {
    Beneficiary {
        name: dto.name.clone(),
        relationship: dto.relationship.clone(),
        identity_document_ref: dto.identity_document_ref.clone(),
        bank_account_ref: dto.bank_account_ref.clone(),
        share_percent: dto.share_percent,
    }
}

/// Builds a domain settlement request from boundary fields.
///
/// # Errors
///
/// Returns `InvalidInput` for empty identifiers, unparseable dates, or
/// unknown enum strings.
#[allow(clippy::too_many_arguments)]
pub fn build_settlement_request(
    tenant_id: &str,
    employee_id: &str,
    classification: &str,
    termination_date: &str,
    notice_disposition: &str,
    fault_category: Option<&str>,
    negotiated_amount_minor: Option<i64>,
    beneficiaries: &[BeneficiaryDto],
) -> Result<SettlementRequest, ApiError> {
    require_non_empty(tenant_id, "tenant_id")?;
    require_non_empty(employee_id, "employee_id")?;

    let request = SettlementRequest {
        tenant_id: TenantId::new(tenant_id),
        employee_id: EmployeeId::new(employee_id),
        classification: classification.parse().map_err(translate_domain_error)?,
        termination_date: parse_date_field(termination_date, "termination_date")?,
        notice_disposition: notice_disposition
            .parse()
            .map_err(translate_domain_error)?,
        fault_category: fault_category
            .map(|s| s.parse().map_err(translate_domain_error))
            .transpose()?,
        negotiated_amount: negotiated_amount_minor.map(Money::from_minor),
        beneficiaries: beneficiaries.iter().map(beneficiary_from_dto).collect(),
    };
    Ok(request)
}

impl CreateCaseRequest {
    /// Converts the request body into a domain settlement request.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for malformed fields.
    pub fn to_settlement_request(&self) -> Result<SettlementRequest, ApiError> {
        build_settlement_request(
            &self.tenant_id,
            &self.employee_id,
            &self.classification,
            &self.termination_date,
            &self.notice_disposition,
            self.fault_category.as_deref(),
            self.negotiated_amount_minor,
            &self.beneficiaries,
        )
    }
}

impl PreviewSettlementRequest {
    /// Converts the request body into a domain settlement request.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for malformed fields.
    pub fn to_settlement_request(&self) -> Result<SettlementRequest, ApiError> {
        build_settlement_request(
            &self.tenant_id,
            &self.employee_id,
            &self.classification,
            &self.termination_date,
            &self.notice_disposition,
            self.fault_category.as_deref(),
            self.negotiated_amount_minor,
            &self.beneficiaries,
        )
    }
}

impl UpsertEmployeeRequest {
    /// Converts the request body into a domain employee profile.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for unknown country or category strings.
    pub fn to_profile(&self) -> Result<EmployeeProfile, ApiError> {
        require_non_empty(&self.tenant_id, "tenant_id")?;
        require_non_empty(&self.employee_id, "employee_id")?;
        let country: CountryCode = self.country.parse().map_err(|_| ApiError::InvalidInput {
            field: String::from("country"),
            message: format!("Unsupported country code '{}'", self.country),
        })?;
        let category: EmployeeCategory =
            self.category.parse().map_err(translate_domain_error)?;
        Ok(EmployeeProfile {
            country,
            category,
            monthly_gross_salaries: self
                .monthly_gross_minor
                .iter()
                .copied()
                .map(Money::from_minor)
                .collect(),
            accrued_vacation_days: self.accrued_vacation_days,
            years_of_service: self.years_of_service,
            contractual_gratification: self.contractual_gratification_minor.map(Money::from_minor),
        })
    }
}

/// Converts a settlement result into its API form.
#[must_use]
pub fn settlement_result_to_dto(result: &SettlementResult) -> SettlementResultDto {
    SettlementResultDto {
        severance_minor: result.severance.minor(),
        vacation_payout_minor: result.vacation_payout.minor(),
        gratification_minor: result.gratification.minor(),
        prorated_salary_minor: result.prorated_salary.minor(),
        notice_payment_minor: result.notice_payment.minor(),
        gross_total_minor: result.gross_total.minor(),
        net_total_minor: result.net_total.minor(),
        years_of_service: result.years_of_service,
        average_monthly_salary_minor: result.average_monthly_salary.minor(),
        calculated_at: result
            .calculated_at
            .format(&Rfc3339)
            .unwrap_or_default(),
        warnings: result.warnings.iter().map(ToString::to_string).collect(),
        apportionment: result
            .apportionment
            .iter()
            .map(|share| BeneficiaryShareDto {
                name: share.name.clone(),
                relationship: share.relationship.clone(),
                bank_account_ref: share.bank_account_ref.clone(),
                share_percent: share.share_percent,
                amount_minor: share.amount.minor(),
            })
            .collect(),
    }
}

/// Builds the poll snapshot for a case.
#[must_use]
pub fn progress_response(case: &TerminationCase) -> ProgressResponse {
    let documents: Option<DocumentRefsDto> = if case.documents.work_certificate.is_some()
        || case.documents.final_payslip.is_some()
        || case.documents.fund_attestation.is_some()
    {
        Some(DocumentRefsDto {
            work_certificate: case.documents.work_certificate.clone(),
            final_payslip: case.documents.final_payslip.clone(),
            fund_attestation: case.documents.fund_attestation.clone(),
        })
    } else {
        None
    };

    ProgressResponse {
        case_id: case.case_id.unwrap_or(0),
        status: case.status.as_str().to_string(),
        progress_percent: case.progress_percent,
        current_step: case.current_step.clone(),
        started_at: case.started_at.clone(),
        completed_at: case.completed_at.clone(),
        error: case.error_message.clone(),
        document_version: case.document_version,
        job_handle: case.job_handle.clone(),
        result: case.result.as_ref().map(settlement_result_to_dto),
        documents,
    }
}

/// Returns true when the case may be regenerated.
#[must_use]
pub const fn is_regenerable(status: CaseStatus) -> bool {
    matches!(status, CaseStatus::Completed | CaseStatus::Failed)
}
