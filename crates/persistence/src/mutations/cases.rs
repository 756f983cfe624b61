// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Termination-case mutation operations.
//!
//! `persist_transition` carries the load-bearing concurrency contract: the
//! case row is updated conditionally on the status the transition was
//! computed from, inside one transaction with the audit insert. Zero rows
//! affected means another writer moved the case first; nothing is written
//! and the caller treats the transition as lost.

use crate::data_models::{NewCaseDocumentRow, NewCaseRow};
use crate::diesel_schema::{case_documents, termination_cases};
use crate::error::PersistenceError;
use crate::mutations::audit::insert_audit_event;
use crate::sqlite::get_last_insert_rowid;
use diesel::SqliteConnection;
use diesel::prelude::*;
use solde::{TerminationCase, TransitionResult};

/// Inserts a new case (status `idle`) and returns its persisted ID.
///
/// # Errors
///
/// Returns an error if serialization or the insert fails.
pub fn insert_case(
    conn: &mut SqliteConnection,
    case: &TerminationCase,
    created_at: &str,
) -> Result<i64, PersistenceError> {
    let row = NewCaseRow {
        tenant_id: case.tenant_id.value().to_string(),
        employee_id: case.employee_id.value().to_string(),
        classification: case.request.classification.as_str().to_string(),
        termination_date: case.request.termination_date.to_string(),
        notice_disposition: case.request.notice_disposition.as_str().to_string(),
        fault_category: case
            .request
            .fault_category
            .map(|f| f.as_str().to_string()),
        negotiated_amount_minor: case.request.negotiated_amount.map(|m| m.minor()),
        beneficiaries_json: serde_json::to_string(&case.request.beneficiaries)?,
        status: case.status.as_str().to_string(),
        progress_percent: i32::from(case.progress_percent),
        current_step: case.current_step.clone(),
        document_version: i32::try_from(case.document_version).unwrap_or(0),
        created_at: created_at.to_string(),
    };

    diesel::insert_into(termination_cases::table)
        .values(&row)
        .execute(conn)?;

    get_last_insert_rowid(conn)
}

/// Persists a case transition atomically with its audit event.
///
/// The update is guarded on the transition's prior status; returns `false`
/// (with nothing written) if the guard lost the race.
///
/// # Errors
///
/// Returns an error if the case has no persisted ID, serialization fails,
/// or the transaction fails.
pub fn persist_transition(
    conn: &mut SqliteConnection,
    transition: &TransitionResult,
    created_at: &str,
) -> Result<bool, PersistenceError> {
    let case: &TerminationCase = &transition.new_case;
    let case_id: i64 = case
        .case_id
        .ok_or_else(|| PersistenceError::QueryFailed(String::from(
            "persist_transition: case has no persisted ID",
        )))?;

    let result_json: Option<String> = case
        .result
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let document_version: i32 = i32::try_from(case.document_version).unwrap_or(0);

    conn.transaction::<bool, PersistenceError, _>(|conn| {
        let updated: usize = diesel::update(
            termination_cases::table
                .filter(termination_cases::case_id.eq(case_id))
                .filter(termination_cases::status.eq(transition.prior_status.as_str())),
        )
        .set((
            termination_cases::status.eq(case.status.as_str()),
            termination_cases::progress_percent.eq(i32::from(case.progress_percent)),
            termination_cases::current_step.eq(case.current_step.clone()),
            termination_cases::error_message.eq(case.error_message.clone()),
            termination_cases::started_at.eq(case.started_at.clone()),
            termination_cases::completed_at.eq(case.completed_at.clone()),
            termination_cases::job_handle.eq(case.job_handle.clone()),
            termination_cases::issuer.eq(case.issuer.clone()),
            termination_cases::pay_date.eq(case.pay_date.clone()),
            termination_cases::document_version.eq(document_version),
            termination_cases::work_certificate_ref.eq(case.documents.work_certificate.clone()),
            termination_cases::final_payslip_ref.eq(case.documents.final_payslip.clone()),
            termination_cases::fund_attestation_ref.eq(case.documents.fund_attestation.clone()),
            termination_cases::result_json.eq(result_json.clone()),
        ))
        .execute(conn)?;

        if updated == 0 {
            // Guard lost: the stored status no longer matches. Write nothing.
            return Ok(false);
        }

        insert_audit_event(conn, Some(case_id), &transition.audit_event, created_at)?;
        Ok(true)
    })
}

/// Records one generated document in the per-version history table.
///
/// # Errors
///
/// Returns an error if the insert fails.
#[allow(clippy::too_many_arguments)]
pub fn insert_document_history(
    conn: &mut SqliteConnection,
    case_id: i64,
    kind: &str,
    reference: &str,
    version: u32,
    issued_by: &str,
    pay_date: &str,
    generated_at: &str,
) -> Result<(), PersistenceError> {
    let row = NewCaseDocumentRow {
        case_id,
        kind: kind.to_string(),
        reference: reference.to_string(),
        version: i32::try_from(version).unwrap_or(0),
        issued_by: issued_by.to_string(),
        pay_date: pay_date.to_string(),
        generated_at: generated_at.to_string(),
    };

    diesel::insert_into(case_documents::table)
        .values(&row)
        .execute(conn)?;
    Ok(())
}
