// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Termination-case query operations.

use crate::data_models::{CaseDocumentRow, CaseRow};
use crate::diesel_schema::{case_documents, termination_cases};
use crate::error::PersistenceError;
use diesel::SqliteConnection;
use diesel::prelude::*;
use solde::{CaseStatus, TerminationCase};

/// Loads one termination case.
///
/// # Errors
///
/// Returns `CaseNotFound` if no row exists, or a reconstruction error if
/// the persisted row fails to parse.
pub fn get_case(
    conn: &mut SqliteConnection,
    case_id: i64,
) -> Result<TerminationCase, PersistenceError> {
    let row: CaseRow = termination_cases::table
        .filter(termination_cases::case_id.eq(case_id))
        .first::<CaseRow>(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_case: {e}")))?
        .ok_or(PersistenceError::CaseNotFound(case_id))?;

    row.into_case()
}

/// Lists the IDs of every case in a given status, oldest first.
///
/// Used at startup to re-enqueue persisted `pending` cases.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_case_ids_with_status(
    conn: &mut SqliteConnection,
    status: CaseStatus,
) -> Result<Vec<i64>, PersistenceError> {
    termination_cases::table
        .filter(termination_cases::status.eq(status.as_str()))
        .order(termination_cases::case_id.asc())
        .select(termination_cases::case_id)
        .load::<i64>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_case_ids_with_status: {e}")))
}

/// Lists `processing` cases whose claim predates the cutoff timestamp.
///
/// Timestamps are RFC 3339 UTC strings, so lexicographic comparison is
/// chronological comparison.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_stale_processing(
    conn: &mut SqliteConnection,
    cutoff: &str,
) -> Result<Vec<i64>, PersistenceError> {
    termination_cases::table
        .filter(termination_cases::status.eq(CaseStatus::Processing.as_str()))
        .filter(termination_cases::started_at.lt(cutoff.to_string()))
        .order(termination_cases::case_id.asc())
        .select(termination_cases::case_id)
        .load::<i64>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_stale_processing: {e}")))
}

/// Lists the generated-document history for a case, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_document_history(
    conn: &mut SqliteConnection,
    case_id: i64,
) -> Result<Vec<CaseDocumentRow>, PersistenceError> {
    case_documents::table
        .filter(case_documents::case_id.eq(case_id))
        .order(case_documents::document_id.asc())
        .load::<CaseDocumentRow>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_document_history: {e}")))
}
