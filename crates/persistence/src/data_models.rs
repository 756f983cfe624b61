// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row structs mapping the Diesel schema to domain types.

use crate::diesel_schema::{audit_events, case_documents, employees, salary_history, termination_cases};
use crate::error::PersistenceError;
use diesel::prelude::*;
use solde::{CaseStatus, DocumentRefs, TerminationCase};
use solde_domain::{
    Beneficiary, CountryCode, DepartureClass, EmployeeCategory, EmployeeId, FaultCategory, Money,
    NoticeDisposition, SettlementRequest, SettlementResult, TenantId,
};
use time::Date;
use time::format_description::well_known::Iso8601;

/// A persisted employee row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = employees)]
pub struct EmployeeRow {
    pub tenant_id: String,
    pub employee_id: String,
    pub country: String,
    pub category: String,
    pub years_of_service: f64,
    pub accrued_vacation_days: i32,
    pub contractual_gratification_minor: Option<i64>,
    pub updated_at: String,
}

/// A persisted monthly salary row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = salary_history)]
pub struct SalaryRow {
    pub tenant_id: String,
    pub employee_id: String,
    pub month_offset: i32,
    pub gross_minor: i64,
}

/// A persisted termination-case row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = termination_cases)]
pub struct CaseRow {
    pub case_id: i64,
    pub tenant_id: String,
    pub employee_id: String,
    pub classification: String,
    pub termination_date: String,
    pub notice_disposition: String,
    pub fault_category: Option<String>,
    pub negotiated_amount_minor: Option<i64>,
    pub beneficiaries_json: String,
    pub status: String,
    pub progress_percent: i32,
    pub current_step: String,
    pub error_message: Option<String>,
    pub job_handle: Option<String>,
    pub issuer: Option<String>,
    pub pay_date: Option<String>,
    pub document_version: i32,
    pub created_at: String,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub work_certificate_ref: Option<String>,
    pub final_payslip_ref: Option<String>,
    pub fund_attestation_ref: Option<String>,
    pub result_json: Option<String>,
}

/// Insertable form of a new termination case.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = termination_cases)]
pub struct NewCaseRow {
    pub tenant_id: String,
    pub employee_id: String,
    pub classification: String,
    pub termination_date: String,
    pub notice_disposition: String,
    pub fault_category: Option<String>,
    pub negotiated_amount_minor: Option<i64>,
    pub beneficiaries_json: String,
    pub status: String,
    pub progress_percent: i32,
    pub current_step: String,
    pub document_version: i32,
    pub created_at: String,
}

/// A persisted generated-document history row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = case_documents)]
pub struct CaseDocumentRow {
    pub document_id: i64,
    pub case_id: i64,
    pub kind: String,
    pub reference: String,
    pub version: i32,
    pub issued_by: String,
    pub pay_date: String,
    pub generated_at: String,
}

/// Insertable form of a generated-document history row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = case_documents)]
pub struct NewCaseDocumentRow {
    pub case_id: i64,
    pub kind: String,
    pub reference: String,
    pub version: i32,
    pub issued_by: String,
    pub pay_date: String,
    pub generated_at: String,
}

/// A persisted audit-event row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = audit_events)]
pub struct AuditEventRow {
    pub event_id: i64,
    pub case_id: Option<i64>,
    pub actor_json: String,
    pub cause_json: String,
    pub action_json: String,
    pub before_snapshot_json: String,
    pub after_snapshot_json: String,
    pub created_at: String,
}

/// Insertable form of an audit-event row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = audit_events)]
pub struct NewAuditEventRow {
    pub case_id: Option<i64>,
    pub actor_json: String,
    pub cause_json: String,
    pub action_json: String,
    pub before_snapshot_json: String,
    pub after_snapshot_json: String,
    pub created_at: String,
}

impl CaseRow {
    /// Reconstructs the domain aggregate from a persisted row.
    ///
    /// # Errors
    ///
    /// Returns a reconstruction error if any persisted enum string, date, or
    /// JSON payload fails to parse.
    pub fn into_case(self) -> Result<TerminationCase, PersistenceError> {
        let classification: DepartureClass = parse_field(&self.classification, "classification")?;
        let notice_disposition: NoticeDisposition =
            parse_field(&self.notice_disposition, "notice_disposition")?;
        let fault_category: Option<FaultCategory> = self
            .fault_category
            .as_deref()
            .map(|s| parse_field(s, "fault_category"))
            .transpose()?;
        let status: CaseStatus = self.status.parse().map_err(|e| {
            PersistenceError::ReconstructionError(format!("status '{}': {e}", self.status))
        })?;
        let termination_date: Date =
            Date::parse(&self.termination_date, &Iso8601::DEFAULT).map_err(|e| {
                PersistenceError::ReconstructionError(format!(
                    "termination_date '{}': {e}",
                    self.termination_date
                ))
            })?;
        let beneficiaries: Vec<Beneficiary> = serde_json::from_str(&self.beneficiaries_json)?;
        let result: Option<SettlementResult> = self
            .result_json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        let request = SettlementRequest {
            tenant_id: TenantId::new(&self.tenant_id),
            employee_id: EmployeeId::new(&self.employee_id),
            classification,
            termination_date,
            notice_disposition,
            fault_category,
            negotiated_amount: self.negotiated_amount_minor.map(Money::from_minor),
            beneficiaries,
        };

        Ok(TerminationCase {
            case_id: Some(self.case_id),
            tenant_id: request.tenant_id.clone(),
            employee_id: request.employee_id.clone(),
            request,
            status,
            progress_percent: clamp_percent(self.progress_percent),
            current_step: self.current_step,
            error_message: self.error_message,
            started_at: self.started_at,
            completed_at: self.completed_at,
            result,
            documents: DocumentRefs {
                work_certificate: self.work_certificate_ref,
                final_payslip: self.final_payslip_ref,
                fund_attestation: self.fund_attestation_ref,
            },
            document_version: u32::try_from(self.document_version).unwrap_or(0),
            job_handle: self.job_handle,
            issuer: self.issuer,
            pay_date: self.pay_date,
        })
    }
}

impl EmployeeRow {
    /// Reconstructs an employee profile, joining in the salary history.
    ///
    /// # Errors
    ///
    /// Returns a reconstruction error if a persisted enum string fails to
    /// parse.
    pub fn into_profile(
        self,
        monthly_gross: Vec<Money>,
    ) -> Result<solde_domain::EmployeeProfile, PersistenceError> {
        let country: CountryCode = parse_field(&self.country, "country")?;
        let category: EmployeeCategory = parse_field(&self.category, "category")?;
        Ok(solde_domain::EmployeeProfile {
            country,
            category,
            monthly_gross_salaries: monthly_gross,
            accrued_vacation_days: u16::try_from(self.accrued_vacation_days.max(0)).unwrap_or(0),
            years_of_service: self.years_of_service,
            contractual_gratification: self.contractual_gratification_minor.map(Money::from_minor),
        })
    }
}

fn parse_field<T>(value: &str, field: &str) -> Result<T, PersistenceError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e| {
        PersistenceError::ReconstructionError(format!("{field} '{value}': {e}"))
    })
}

fn clamp_percent(value: i32) -> u8 {
    u8::try_from(value.clamp(0, 100)).unwrap_or(100)
}
